//! Actor classification for transcript display.
//!
//! Event sources are free-text strings chosen by upstream services, so the
//! mapping to a display identity is substring-based and ordered: the first
//! matching rule wins. The order is part of the contract — a source like
//! "intent_tasker" must classify as the orchestrator, not the planner.

use serde::Serialize;

/// Icon and label shown next to a transcript bubble. Derived purely from the
/// event source; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayIdentity {
    pub icon: &'static str,
    pub label: String,
}

/// Which side of the transcript a bubble renders on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// CSS class fragment for the bubble wrapper.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Ordered classification rules: (keywords, icon, label). Evaluated top to
/// bottom against the lowercased source; any keyword hit selects the rule.
const RULES: &[(&[&str], &str, &str)] = &[
    (&["orchestrator", "intent"], "🧭", "IntentOrchestrator"),
    (&["task", "planner"], "📝", "TaskPlanner"),
    (&["office", "automation", "emailer"], "🤖", "OfficeAutomation"),
];

const FALLBACK_ICON: &str = "💬";

/// Maps an event source to its display identity.
///
/// Case-insensitive, first match wins. Unrecognized sources fall back to a
/// generic icon with the raw (original-case) source as the label.
pub fn classify(source: &str) -> DisplayIdentity {
    let lowered = source.to_lowercase();
    for (keywords, icon, label) in RULES {
        if keywords.iter().any(|keyword| lowered.contains(keyword)) {
            return DisplayIdentity {
                icon,
                label: (*label).to_string(),
            };
        }
    }
    DisplayIdentity {
        icon: FALLBACK_ICON,
        label: if source.is_empty() {
            "unknown".to_string()
        } else {
            source.to_string()
        },
    }
}

/// Picks the transcript side for a source, independently of [`classify`]:
/// anything containing "agent" renders on the right.
pub fn side(source: &str) -> Side {
    if source.to_lowercase().contains("agent") {
        Side::Right
    } else {
        Side::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orchestrator_keywords() {
        assert_eq!(classify("intent_orchestrator").label, "IntentOrchestrator");
        assert_eq!(classify("INTENT-ROUTER").label, "IntentOrchestrator");
    }

    #[test]
    fn planner_keywords() {
        assert_eq!(classify("agent_tasker").label, "TaskPlanner");
        assert_eq!(classify("Planner9000").label, "TaskPlanner");
    }

    #[test]
    fn office_keywords_any_case() {
        assert_eq!(classify("OfficeAutomationEmailer").label, "OfficeAutomation");
        assert_eq!(classify("EMAILER").label, "OfficeAutomation");
    }

    #[test]
    fn priority_order_is_first_match_wins() {
        // Matches both the orchestrator and planner rules; the earlier wins.
        assert_eq!(classify("intent_tasker").label, "IntentOrchestrator");
    }

    #[test]
    fn fallback_preserves_original_case() {
        let identity = classify("MyAgentX");
        assert_eq!(identity.label, "MyAgentX");
        assert_eq!(identity.icon, FALLBACK_ICON);
    }

    #[test]
    fn empty_source_falls_back_to_unknown() {
        assert_eq!(classify("").label, "unknown");
    }

    #[test]
    fn side_is_independent_of_classification() {
        // Fallback identity, but still right-aligned because of "agent".
        assert_eq!(side("MyAgentX"), Side::Right);
        // Orchestrator identity can also sit on the right.
        assert_eq!(classify("agent_orchestrator").label, "IntentOrchestrator");
        assert_eq!(side("agent_orchestrator"), Side::Right);
        assert_eq!(side("intent_orchestrator"), Side::Left);
        assert_eq!(side(""), Side::Left);
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Right).unwrap(), "\"right\"");
        assert_eq!(serde_json::to_string(&Side::Left).unwrap(), "\"left\"");
    }
}
