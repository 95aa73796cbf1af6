use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Status
// ============================================================================

/// Lifecycle of a lead automation configuration.
///
/// `Draft -> Active <-> Paused`, any non-archived status `-> Archived`.
/// `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadAutomationStatus {
    Draft,
    Active,
    Paused,
    Archived,
}

impl LeadAutomationStatus {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "draft" => Ok(LeadAutomationStatus::Draft),
            "active" => Ok(LeadAutomationStatus::Active),
            "paused" => Ok(LeadAutomationStatus::Paused),
            "archived" => Ok(LeadAutomationStatus::Archived),
            _ => Err(format!("Unknown lead automation status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadAutomationStatus::Draft => "draft",
            LeadAutomationStatus::Active => "active",
            LeadAutomationStatus::Paused => "paused",
            LeadAutomationStatus::Archived => "archived",
        }
    }

    pub fn can_transition_to(&self, next: LeadAutomationStatus) -> bool {
        use LeadAutomationStatus::*;
        matches!(
            (self, next),
            (Draft, Active)
                | (Draft, Archived)
                | (Active, Paused)
                | (Active, Archived)
                | (Paused, Active)
                | (Paused, Archived)
        )
    }
}

// ============================================================================
// Aggregate
// ============================================================================

pub const MIN_FOLLOW_UP_DELAY_HOURS: u32 = 1;
pub const MAX_FOLLOW_UP_DELAY_HOURS: u32 = 720;
pub const MAX_FOLLOW_UPS: u32 = 10;

/// Automatic first contact and follow-ups sent to new leads of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadAutomation {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    /// First message sent when the lead is created
    pub greeting_message: String,
    pub follow_up_message: Option<String>,
    pub follow_up_delay_hours: u32,
    pub max_follow_ups: u32,
    pub status: LeadAutomationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

impl LeadAutomation {
    pub fn new_for_insert(user_id: String, name: String, greeting_message: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            greeting_message,
            follow_up_message: None,
            follow_up_delay_hours: 24,
            max_follow_ups: 3,
            status: LeadAutomationStatus::Draft,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.user_id.trim().is_empty() {
            return Err("user_id is required".into());
        }
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if self.greeting_message.trim().is_empty() {
            return Err("greeting_message is required".into());
        }
        if !(MIN_FOLLOW_UP_DELAY_HOURS..=MAX_FOLLOW_UP_DELAY_HOURS)
            .contains(&self.follow_up_delay_hours)
        {
            return Err(format!(
                "follow_up_delay_hours must be between {} and {}",
                MIN_FOLLOW_UP_DELAY_HOURS, MAX_FOLLOW_UP_DELAY_HOURS
            ));
        }
        if self.max_follow_ups > MAX_FOLLOW_UPS {
            return Err(format!("max_follow_ups must not exceed {}", MAX_FOLLOW_UPS));
        }
        if self.max_follow_ups > 0
            && self
                .follow_up_message
                .as_deref()
                .map_or(true, |m| m.trim().is_empty())
        {
            return Err("follow_up_message is required when follow-ups are enabled".into());
        }
        Ok(())
    }

    pub fn is_editable(&self) -> bool {
        self.status != LeadAutomationStatus::Archived
    }

    pub fn transition_to(&mut self, next: LeadAutomationStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Transition {} -> {} is not allowed",
                self.status.as_str(),
                next.as_str()
            ));
        }
        if next == LeadAutomationStatus::Active {
            // Only a complete configuration may start sending messages
            self.validate()?;
        }
        self.status = next;
        Ok(())
    }

    /// Bump version and timestamp before persisting
    pub fn before_write(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LeadAutomation {
        let mut automation = LeadAutomation::new_for_insert(
            "user-1".into(),
            "Boas-vindas".into(),
            "Olá! Recebemos seu contato.".into(),
        );
        automation.follow_up_message = Some("Ainda tem interesse no imóvel?".into());
        automation
    }

    #[test]
    fn test_new_is_draft_and_valid() {
        let automation = sample();
        assert_eq!(automation.status, LeadAutomationStatus::Draft);
        assert!(automation.validate().is_ok());
    }

    #[test]
    fn test_validation_rules() {
        let mut automation = sample();
        automation.follow_up_delay_hours = 0;
        assert!(automation.validate().is_err());

        let mut automation = sample();
        automation.max_follow_ups = MAX_FOLLOW_UPS + 1;
        assert!(automation.validate().is_err());

        let mut automation = sample();
        automation.follow_up_message = None;
        assert!(automation.validate().is_err());
        automation.max_follow_ups = 0;
        assert!(automation.validate().is_ok());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut automation = sample();
        automation.transition_to(LeadAutomationStatus::Active).unwrap();
        automation.transition_to(LeadAutomationStatus::Paused).unwrap();
        automation.transition_to(LeadAutomationStatus::Active).unwrap();
        automation.transition_to(LeadAutomationStatus::Archived).unwrap();
        assert!(!automation.is_editable());
        assert!(automation
            .transition_to(LeadAutomationStatus::Active)
            .is_err());
    }

    #[test]
    fn test_draft_cannot_pause() {
        let mut automation = sample();
        assert!(automation
            .transition_to(LeadAutomationStatus::Paused)
            .is_err());
        assert_eq!(automation.status, LeadAutomationStatus::Draft);
    }

    #[test]
    fn test_activation_requires_valid_config() {
        let mut automation = sample();
        automation.greeting_message = "  ".into();
        assert!(automation
            .transition_to(LeadAutomationStatus::Active)
            .is_err());
        assert_eq!(automation.status, LeadAutomationStatus::Draft);
    }

    #[test]
    fn test_status_codes_roundtrip() {
        for status in [
            LeadAutomationStatus::Draft,
            LeadAutomationStatus::Active,
            LeadAutomationStatus::Paused,
            LeadAutomationStatus::Archived,
        ] {
            assert_eq!(LeadAutomationStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(LeadAutomationStatus::from_str("deleted").is_err());
    }
}
