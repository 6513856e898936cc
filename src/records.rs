//! Leave records as they are kept by the persistence layer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive number of days covered by a leave from `start` to `end`. The order
/// of the two dates does not matter.
pub fn calculate_days(start: NaiveDate, end: NaiveDate) -> u32 {
    let span = (end - start).num_days().unsigned_abs();
    u32::try_from(span).unwrap_or(u32::MAX).saturating_add(1)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaveType {
    Sick,
    Personal,
    Maternity,
    /// Arriving after the start of the working day
    Late,
    /// Leaving the school grounds during working hours
    OffCampus,
}

impl LeaveType {
    /// Requests measured in hours on one day rather than in whole days
    pub fn is_time_based(self) -> bool {
        matches!(self, LeaveType::Late | LeaveType::OffCampus)
    }

    /// What is being requested, as it reads after `ขอ` or `ได้`
    pub fn label(self) -> &'static str {
        match self {
            LeaveType::Sick => "ลาป่วย",
            LeaveType::Personal => "ลากิจส่วนตัว",
            LeaveType::Maternity => "ลาคลอดบุตร",
            LeaveType::Late => "อนุญาตเข้าสาย",
            LeaveType::OffCampus => "อนุญาตออกนอกบริเวณโรงเรียน",
        }
    }

    /// Short category name used in the statistics table
    pub fn category(self) -> &'static str {
        match self {
            LeaveType::Sick => "ป่วย",
            LeaveType::Personal => "กิจส่วนตัว",
            LeaveType::Maternity => "คลอดบุตร",
            LeaveType::Late => "เข้าสาย",
            LeaveType::OffCampus => "ออกนอกบริเวณ",
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaveStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn label(self) -> &'static str {
        match self {
            LeaveStatus::Pending => "รอพิจารณา",
            LeaveStatus::Approved => "อนุญาต",
            LeaveStatus::Rejected => "ไม่อนุญาต",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    #[serde(default)]
    pub position: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// `HH:MM`, only meaningful for time-based requests
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub reason: String,
    /// Where the requester can be reached while away
    #[serde(default)]
    pub contact_info: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: LeaveStatus,
    /// When the form was written; the start date is used when absent
    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    /// When the director decided on the request
    #[serde(default)]
    pub approved_date: Option<NaiveDate>,
}

impl LeaveRequest {
    pub fn days(&self) -> u32 {
        calculate_days(self.start_date, self.end_date)
    }

    pub fn written_on(&self) -> NaiveDate {
        self.created_date.unwrap_or(self.start_date)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The most recent earlier leave of a teacher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastLeave {
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
}

/// Totals of a teacher's earlier leaves in the current fiscal year. Day-based
/// categories are in days, time-based categories in occurrences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaveStats {
    pub prev_sick: u32,
    pub prev_personal: u32,
    pub prev_maternity: u32,
    pub prev_late: u32,
    pub prev_off_campus: u32,
    pub last_leave: Option<LastLeave>,
}

impl LeaveStats {
    pub fn previous(&self, leave_type: LeaveType) -> u32 {
        match leave_type {
            LeaveType::Sick => self.prev_sick,
            LeaveType::Personal => self.prev_personal,
            LeaveType::Maternity => self.prev_maternity,
            LeaveType::Late => self.prev_late,
            LeaveType::OffCampus => self.prev_off_campus,
        }
    }
}
