pub mod a001_lead_automation;
pub mod a002_whatsapp_instance;
pub mod error;
