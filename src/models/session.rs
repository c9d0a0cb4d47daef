use serde::{Deserialize, Serialize};

/// A cause pot as returned by the pots endpoint. Only the fields this crate
/// reads are typed; the rest of the payload is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub admin_address: Option<String>,
}

/// A friend of the session user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// An entry in the session user's activity feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub pot_id: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Everything a successful bootstrap loaded for one user address
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionData {
    pub user_address: String,
    pub pots: Vec<Pot>,
    pub friends: Vec<Friend>,
    pub activities: Vec<Activity>,
}
