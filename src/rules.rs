use crate::errors::HabitError;
use crate::models::{Rule, RuleInput, RuleTarget};

pub const RULE_REQUIRED: &str = "Please give the rule a name.";
pub const RULE_SAVED: &str = "Your rule has been saved successfully!";
pub const RULE_UPDATED: &str = "All set! Your changes have been saved successfully!";
pub const RULE_REMOVED: &str = "Your item has been removed";

fn build_rule(input: RuleInput) -> Result<Rule, HabitError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(HabitError::Validation(RULE_REQUIRED.to_string()));
    }
    let apply_to = if input.apply_to.trim().is_empty() {
        RuleTarget::default()
    } else {
        input.apply_to.parse().map_err(HabitError::Validation)?
    };
    Ok(Rule {
        name: name.to_string(),
        description: input.description.trim().to_string(),
        apply_to,
    })
}

pub fn save_rule(rules: &mut Vec<Rule>, input: RuleInput) -> Result<Rule, HabitError> {
    let rule = build_rule(input)?;
    if rules.iter().any(|existing| existing.name == rule.name) {
        return Err(HabitError::DuplicateRule(rule.name));
    }
    rules.push(rule.clone());
    Ok(rule)
}

/// Replaces the rule called `name` in place. Renaming onto another rule's
/// name is refused.
pub fn update_rule(rules: &mut [Rule], name: &str, input: RuleInput) -> Result<Rule, HabitError> {
    let rule = build_rule(input)?;
    let index = position(rules, name)?;
    if rule.name != rules[index].name && rules.iter().any(|existing| existing.name == rule.name) {
        return Err(HabitError::DuplicateRule(rule.name));
    }
    rules[index] = rule.clone();
    Ok(rule)
}

pub fn delete_rule(rules: &mut Vec<Rule>, name: &str) -> Result<Rule, HabitError> {
    let index = position(rules, name)?;
    Ok(rules.remove(index))
}

fn position(rules: &[Rule], name: &str) -> Result<usize, HabitError> {
    let name = name.trim();
    rules
        .iter()
        .position(|rule| rule.name == name)
        .ok_or_else(|| HabitError::RuleNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, apply_to: &str) -> RuleInput {
        RuleInput {
            name: name.into(),
            description: " when overdue ".into(),
            apply_to: apply_to.into(),
        }
    }

    #[test]
    fn save_validates_and_rejects_duplicates() {
        let mut rules = Vec::new();
        let saved = save_rule(&mut rules, input(" Overdue ", "habit")).unwrap();
        assert_eq!(saved.name, "Overdue");
        assert_eq!(saved.description, "when overdue");
        assert_eq!(saved.apply_to, RuleTarget::Habit);

        assert!(matches!(
            save_rule(&mut rules, input("Overdue", "Task")),
            Err(HabitError::DuplicateRule(_))
        ));
        let err = save_rule(&mut rules, input("  ", "Task")).unwrap_err();
        assert_eq!(err.to_string(), RULE_REQUIRED);
        assert!(save_rule(&mut rules, input("Other", "project")).is_err());
        assert_eq!(save_rule(&mut rules, input("Other", "")).unwrap().apply_to, RuleTarget::Task);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn update_replaces_in_place_by_name() {
        let mut rules = Vec::new();
        save_rule(&mut rules, input("First", "Task")).unwrap();
        save_rule(&mut rules, input("Second", "Task")).unwrap();

        update_rule(&mut rules, "First", input("Renamed", "Habit")).unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Renamed", "Second"]);
        assert_eq!(rules[0].apply_to, RuleTarget::Habit);

        update_rule(&mut rules, "Second", input("Second", "Habit")).unwrap();
        assert!(matches!(
            update_rule(&mut rules, "Second", input("Renamed", "Task")),
            Err(HabitError::DuplicateRule(_))
        ));
        assert!(matches!(
            update_rule(&mut rules, "Missing", input("X", "Task")),
            Err(HabitError::RuleNotFound(_))
        ));
    }

    #[test]
    fn delete_by_name() {
        let mut rules = Vec::new();
        save_rule(&mut rules, input("Only", "Task")).unwrap();
        assert_eq!(delete_rule(&mut rules, "Only").unwrap().name, "Only");
        assert!(rules.is_empty());
        assert!(delete_rule(&mut rules, "Only").unwrap_err().is_missing());
    }
}
