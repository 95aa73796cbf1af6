use serde::{Deserialize, Serialize};

/// Roles of CRM users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Manager,
    Marketing,
    Consultant,
    BrokerSenior,
    BrokerJunior,
    BrokerTrainee,
    Executive,
}

impl UserRole {
    /// Code stored in `sys_users.role`
    pub fn code(&self) -> &'static str {
        match self {
            UserRole::Manager => "manager",
            UserRole::Marketing => "marketing",
            UserRole::Consultant => "consultant",
            UserRole::BrokerSenior => "broker-senior",
            UserRole::BrokerJunior => "broker-junior",
            UserRole::BrokerTrainee => "broker-trainee",
            UserRole::Executive => "executive",
        }
    }

    /// Human-readable name (pt-BR)
    pub fn display_name(&self) -> &'static str {
        match self {
            UserRole::Manager => "Gerente",
            UserRole::Marketing => "Marketing",
            UserRole::Consultant => "Consultor",
            UserRole::BrokerSenior => "Corretor Sênior",
            UserRole::BrokerJunior => "Corretor Júnior",
            UserRole::BrokerTrainee => "Corretor Trainee",
            UserRole::Executive => "Executivo",
        }
    }

    pub fn all() -> Vec<UserRole> {
        vec![
            UserRole::Manager,
            UserRole::Marketing,
            UserRole::Consultant,
            UserRole::BrokerSenior,
            UserRole::BrokerJunior,
            UserRole::BrokerTrainee,
            UserRole::Executive,
        ]
    }

    /// Case-insensitive parse; `_` and `-` are interchangeable
    /// (`broker_senior` == `broker-senior`).
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.trim().to_lowercase().replace('_', "-");
        UserRole::all()
            .into_iter()
            .find(|role| role.code() == normalized)
    }
}

/// Dashboard view a role is projected onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Manager,
    Marketing,
    Consultant,
    Broker,
    Executive,
}

impl ViewKind {
    pub fn code(&self) -> &'static str {
        match self {
            ViewKind::Manager => "manager",
            ViewKind::Marketing => "marketing",
            ViewKind::Consultant => "consultant",
            ViewKind::Broker => "broker",
            ViewKind::Executive => "executive",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ViewKind::Manager => "Painel do Gerente",
            ViewKind::Marketing => "Painel de Marketing",
            ViewKind::Consultant => "Painel do Consultor",
            ViewKind::Broker => "Painel do Corretor",
            ViewKind::Executive => "Painel Executivo",
        }
    }

    pub fn all() -> Vec<ViewKind> {
        vec![
            ViewKind::Manager,
            ViewKind::Marketing,
            ViewKind::Consultant,
            ViewKind::Broker,
            ViewKind::Executive,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_roundtrips_every_role() {
        for role in UserRole::all() {
            assert_eq!(UserRole::from_code(role.code()), Some(role));
        }
    }

    #[test]
    fn test_from_code_normalizes_input() {
        assert_eq!(
            UserRole::from_code(" Broker_Senior "),
            Some(UserRole::BrokerSenior)
        );
        assert_eq!(UserRole::from_code("corretor"), None);
    }
}
