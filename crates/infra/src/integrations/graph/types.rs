//! Graph wire types for `getSchedule` and the token endpoint

use presencesync_domain::{EventDateTime, ScheduleError, ScheduleItem, ScheduleResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetScheduleRequest {
    pub schedules: Vec<String>,
    pub start_time: GraphDateTime,
    pub end_time: GraphDateTime,
    pub availability_view_interval: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDateTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Deserialize)]
pub struct GetScheduleResponse {
    #[serde(default)]
    pub value: Vec<GraphScheduleInformation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphScheduleInformation {
    pub schedule_id: String,
    #[serde(default)]
    pub availability_view: String,
    #[serde(default)]
    pub schedule_items: Vec<GraphScheduleItem>,
    #[serde(default)]
    pub error: Option<GraphFreeBusyError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphScheduleItem {
    #[serde(default)]
    pub status: Option<String>,
    pub start: GraphDateTime,
    pub end: GraphDateTime,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphFreeBusyError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub response_code: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

const fn default_expires_in() -> u64 {
    3599
}

impl From<GraphDateTime> for EventDateTime {
    fn from(value: GraphDateTime) -> Self {
        Self { date_time: value.date_time, time_zone: value.time_zone }
    }
}

impl From<GraphScheduleItem> for ScheduleItem {
    fn from(item: GraphScheduleItem) -> Self {
        Self {
            start: item.start.into(),
            end: item.end.into(),
            subject: item.subject.unwrap_or_default(),
            location: item.location.unwrap_or_default(),
            status: item.status,
            is_private: item.is_private,
        }
    }
}

impl From<GraphScheduleInformation> for ScheduleResult {
    fn from(info: GraphScheduleInformation) -> Self {
        Self {
            schedule_id: info.schedule_id,
            availability_view: info.availability_view,
            items: info.schedule_items.into_iter().map(ScheduleItem::from).collect(),
            error: info.error.map(|err| ScheduleError {
                message: err.message,
                response_code: err.response_code,
            }),
        }
    }
}
