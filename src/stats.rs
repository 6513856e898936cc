use crate::records::{LastLeave, LeaveRequest, LeaveStats, LeaveStatus, LeaveType};
use chrono::{Datelike, NaiveDate};

/// Thai government fiscal year (Gregorian) a date falls in. The fiscal year
/// runs from 1 October to 30 September and is named after the year it ends in.
pub fn fiscal_year(date: NaiveDate) -> i32 {
    if date.month() >= 10 {
        date.year() + 1
    } else {
        date.year()
    }
}

impl LeaveStats {
    /// Aggregate the approved leaves in `history` that the same teacher took
    /// before `request`, within the request's fiscal year. The request itself and
    /// any pending or rejected entries are ignored.
    pub fn from_history(request: &LeaveRequest, history: &[LeaveRequest]) -> LeaveStats {
        let year = fiscal_year(request.start_date);
        let earlier = history.iter().filter(|past| {
            past.id != request.id
                && past.teacher_id == request.teacher_id
                && past.status == LeaveStatus::Approved
                && past.start_date < request.start_date
                && fiscal_year(past.start_date) == year
        });

        let mut stats = LeaveStats::default();
        let mut last: Option<&LeaveRequest> = None;
        for past in earlier {
            let total = match past.leave_type {
                LeaveType::Sick => &mut stats.prev_sick,
                LeaveType::Personal => &mut stats.prev_personal,
                LeaveType::Maternity => &mut stats.prev_maternity,
                LeaveType::Late => &mut stats.prev_late,
                LeaveType::OffCampus => &mut stats.prev_off_campus,
            };
            let amount = if past.leave_type.is_time_based() { 1 } else { past.days() };
            *total = total.saturating_add(amount);
            // the "last leave" line only compares like with like
            if past.leave_type.is_time_based() == request.leave_type.is_time_based()
                && last.map_or(true, |last| past.start_date > last.start_date)
            {
                last = Some(past);
            }
        }

        stats.last_leave = last.map(|past| LastLeave {
            leave_type: past.leave_type,
            start_date: past.start_date,
            end_date: past.end_date,
            days: past.days(),
        });
        stats
    }
}
