use crate::classify::outcome::ClassificationResult;
use crate::model::UrgencyLevel;
use crate::rules::schema::{RuleTable, SymptomRule};
use tracing::debug;

/// Classify a symptom description against a rule table.
///
/// Every rule with at least one keyword contained in `text` matches. The
/// highest urgency among matched rules wins, so one emergency keyword
/// overrides everything else in the text. `text` is assumed non-blank.
pub fn classify(text: &str, table: &RuleTable) -> ClassificationResult {
    let matched: Vec<&SymptomRule> = table
        .rules
        .iter()
        .filter(|rule| rule_matches(rule, text))
        .collect();

    if matched.is_empty() {
        debug!(table = %table.name, "no symptom rule matched, using fallback");
        return fallback(table);
    }

    let urgency = matched
        .iter()
        .map(|r| r.urgency)
        .max()
        .unwrap_or_default();

    let (department_title, description) = compose_title(&matched, urgency, table);

    // Target types: escalation type first for urgent tiers, then every matched rule's types
    let mut target_facility_types = Vec::new();
    if urgency > UrgencyLevel::Normal {
        push_unique(&mut target_facility_types, &table.escalation_type);
    }
    for rule in &matched {
        for t in &rule.target_types {
            push_unique(&mut target_facility_types, t);
        }
    }

    let mut name_keywords = Vec::new();
    for rule in matched.iter().filter(|r| !table.is_triage_label(&r.department)) {
        let token = rule.department.split('/').next().unwrap_or(&rule.department);
        push_unique(&mut name_keywords, token);
    }

    let matched_departments: Vec<String> = matched.iter().map(|r| r.department.clone()).collect();

    debug!(
        urgency = %urgency,
        matched = matched.len(),
        departments = ?matched_departments,
        "classified symptom text"
    );

    ClassificationResult {
        department_title,
        description,
        urgency_level: urgency,
        is_complex: matched.len() > 1,
        target_facility_types,
        name_keywords,
        matched_departments,
    }
}

fn rule_matches(rule: &SymptomRule, text: &str) -> bool {
    rule.keywords.iter().any(|k| text.contains(k.as_str()))
}

fn fallback(table: &RuleTable) -> ClassificationResult {
    let mut target_facility_types = Vec::new();
    for t in &table.fallback.target_types {
        push_unique(&mut target_facility_types, t);
    }

    ClassificationResult {
        department_title: table.fallback.title.clone(),
        description: table.fallback.description.clone(),
        urgency_level: UrgencyLevel::Normal,
        is_complex: false,
        target_facility_types,
        name_keywords: Vec::new(),
        matched_departments: Vec::new(),
    }
}

/// Build the title and description for the resolved urgency tier.
fn compose_title(
    matched: &[&SymptomRule],
    urgency: UrgencyLevel,
    table: &RuleTable,
) -> (String, String) {
    let messages = &table.messages;

    match urgency {
        UrgencyLevel::Emergency => (
            messages.emergency_title.clone(),
            messages.emergency_description.clone(),
        ),
        UrgencyLevel::Urgent => {
            let mut departments = Vec::new();
            for rule in matched.iter().filter(|r| !table.is_triage_label(&r.department)) {
                push_unique(&mut departments, &rule.department);
            }
            let title = if departments.is_empty() {
                messages.urgent_title.clone()
            } else {
                format!("{} {}", departments.join(", "), messages.urgent_qualifier)
            };
            (title, messages.urgent_description.clone())
        }
        UrgencyLevel::Normal => {
            let mut departments = Vec::new();
            for rule in matched {
                push_unique(&mut departments, &rule.department);
            }
            let description = match matched {
                [single] => format!("{}{}", single.description, messages.specialist_suffix),
                _ => messages.complex_description.clone(),
            };
            (departments.join(", "), description)
        }
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::default_table;
    use crate::rules::schema::{FallbackDef, TriageMessages};

    fn rule(keywords: &[&str], department: &str, types: &[&str], urgency: UrgencyLevel) -> SymptomRule {
        SymptomRule {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            department: department.into(),
            description: format!("{department} problem"),
            target_types: types.iter().map(|s| s.to_string()).collect(),
            urgency,
        }
    }

    fn make_table() -> RuleTable {
        RuleTable {
            name: "Test triage".into(),
            description: None,
            version: "1.0".into(),
            fallback: FallbackDef {
                title: "Nearby hospital".into(),
                description: "General care".into(),
                target_types: vec![
                    "general-hospital".into(),
                    "hospital".into(),
                    "clinic".into(),
                    "internal-medicine".into(),
                ],
            },
            messages: TriageMessages {
                emergency_title: "Emergency detected".into(),
                emergency_description: "Go to an emergency room".into(),
                urgent_qualifier: "(after hours)".into(),
                urgent_title: "After-hours care".into(),
                urgent_description: "Open now".into(),
                complex_description: "Several symptoms combined".into(),
                specialist_suffix: ", specialist first".into(),
            },
            escalation_type: "general-hospital".into(),
            triage_labels: vec!["emergency department".into(), "night care/ER".into()],
            rules: vec![
                rule(
                    &["breath", "chest"],
                    "emergency department",
                    &["general-hospital", "hospital"],
                    UrgencyLevel::Emergency,
                ),
                rule(&["night"], "night care/ER", &["hospital"], UrgencyLevel::Urgent),
                rule(
                    &["stomach", "nausea"],
                    "internal-medicine",
                    &["internal-medicine", "clinic"],
                    UrgencyLevel::Normal,
                ),
                rule(&["tooth", "gum"], "dental", &["dental"], UrgencyLevel::Normal),
                rule(&["fever"], "internal-medicine", &["internal-medicine"], UrgencyLevel::Urgent),
                rule(&["knee"], "orthopedics/sports", &["orthopedics"], UrgencyLevel::Normal),
            ],
        }
    }

    #[test]
    fn test_no_match_returns_fallback() {
        let result = classify("I feel strange", &make_table());
        assert_eq!(result.department_title, "Nearby hospital");
        assert_eq!(result.urgency_level, UrgencyLevel::Normal);
        assert_eq!(
            result.target_facility_types,
            vec!["general-hospital", "hospital", "clinic", "internal-medicine"]
        );
        assert!(!result.is_complex);
        assert!(result.name_keywords.is_empty());
        assert!(result.is_fallback());
    }

    #[test]
    fn test_single_normal_rule() {
        let result = classify("my tooth hurts", &make_table());
        assert_eq!(result.department_title, "dental");
        assert_eq!(result.description, "dental problem, specialist first");
        assert_eq!(result.urgency_level, UrgencyLevel::Normal);
        assert!(!result.is_complex);
        assert_eq!(result.target_facility_types, vec!["dental"]);
        assert_eq!(result.name_keywords, vec!["dental"]);
    }

    #[test]
    fn test_matching_is_case_sensitive_substring() {
        let table = make_table();
        assert!(classify("TOOTH", &table).is_fallback());
        assert!(!classify("toothache", &table).is_fallback());
    }

    #[test]
    fn test_emergency_overrides_other_departments() {
        let result = classify("stomach ache and short of breath", &make_table());
        assert_eq!(result.urgency_level, UrgencyLevel::Emergency);
        assert_eq!(result.department_title, "Emergency detected");
        assert_eq!(result.description, "Go to an emergency room");
        assert!(result.is_complex);
        assert_eq!(result.target_facility_types[0], "general-hospital");
        assert!(result.target_facility_types.contains(&"clinic".to_string()));
        // Triage labels never become name keywords
        assert_eq!(result.name_keywords, vec!["internal-medicine"]);
    }

    #[test]
    fn test_urgent_title_lists_real_departments() {
        let result = classify("tooth pain at night", &make_table());
        assert_eq!(result.urgency_level, UrgencyLevel::Urgent);
        assert_eq!(result.department_title, "dental (after hours)");
        assert_eq!(result.description, "Open now");
        assert_eq!(result.target_facility_types, vec!["general-hospital", "hospital", "dental"]);
    }

    #[test]
    fn test_urgent_with_only_triage_label() {
        let result = classify("it is night", &make_table());
        assert_eq!(result.urgency_level, UrgencyLevel::Urgent);
        assert_eq!(result.department_title, "After-hours care");
        assert!(result.name_keywords.is_empty());
    }

    #[test]
    fn test_duplicate_departments_joined_once() {
        // Two rules share the internal-medicine department
        let result = classify("fever and nausea", &make_table());
        assert_eq!(result.urgency_level, UrgencyLevel::Urgent);
        assert_eq!(result.department_title, "internal-medicine (after hours)");
        assert_eq!(result.name_keywords, vec!["internal-medicine"]);
        assert!(result.is_complex);
    }

    #[test]
    fn test_normal_complex_description() {
        let result = classify("gum and knee", &make_table());
        assert_eq!(result.department_title, "dental, orthopedics/sports");
        assert_eq!(result.description, "Several symptoms combined");
        assert!(result.is_complex);
        // Only the first segment of a slash-separated department is a name keyword
        assert_eq!(result.name_keywords, vec!["dental", "orthopedics"]);
    }

    #[test]
    fn test_is_complex_counts_rules_not_keywords() {
        // Two keywords of the same rule are still one matched rule
        let result = classify("tooth and gum", &make_table());
        assert!(!result.is_complex);
    }

    #[test]
    fn test_builtin_emergency_scenario() {
        let table = default_table().unwrap();
        let result = classify("배가 아프고 숨쉬기가 힘들어요", &table);
        assert_eq!(result.urgency_level, UrgencyLevel::Emergency);
        assert_eq!(result.department_title, "응급 상황 감지");
        assert!(result.target_facility_types.contains(&"종합병원".to_string()));
        assert_eq!(result.name_keywords, vec!["내과"]);
        assert!(result.is_complex);
    }

    #[test]
    fn test_builtin_dental_scenario() {
        let table = default_table().unwrap();
        let result = classify("이가 아파요", &table);
        assert_eq!(result.urgency_level, UrgencyLevel::Normal);
        assert_eq!(result.department_title, "치과");
        assert_eq!(result.description, "구강 질환 관련 전문 병원을 우선 추천합니다.");
        assert_eq!(result.name_keywords, vec!["치과"]);
        assert_eq!(result.target_facility_types, vec!["치과병원", "치과"]);
    }

    #[test]
    fn test_builtin_night_stomach_is_urgent() {
        let table = default_table().unwrap();
        let result = classify("밤인데 설사가 심해요", &table);
        assert_eq!(result.urgency_level, UrgencyLevel::Urgent);
        assert_eq!(result.department_title, "내과 (야간/진료가능)");
        assert_eq!(result.target_facility_types[0], "종합병원");
    }
}
