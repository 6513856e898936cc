//! The leave workflow around the composers.
//!
//! Persistence and message delivery belong to the host application and are
//! reached through the [Store] and [Notifier] traits. [LeaveOffice] strings them
//! together with a [Stamper]: it loads a request and its history, composes the
//! form, records decisions and tells the requester about them.

use crate::assets::AssetFetcher;
use crate::records::{LeaveRequest, LeaveStats, LeaveStatus, StaffMember};
use crate::stamp::{ComposedDocument, LeaveFormRequest, Stamper};
use crate::StampError;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

pub const LEAVE_REQUESTS: &str = "leaveRequests";
pub const STAFF: &str = "staff";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("store failure: {0}")]
    Store(String),

    #[error("no record {id} in {collection}")]
    NotFound { collection: String, id: String },

    #[error("malformed record: {0}")]
    Record(#[from] serde_json::Error),

    #[error(transparent)]
    Stamp(#[from] StampError),
}

/// Equality filter on one field of a record
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn equals<F: Into<String>, V: Into<Value>>(field: F, value: V) -> Filter {
        Filter {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Value) -> bool {
        record.get(&self.field) == Some(&self.value)
    }
}

pub type ChangeHandler = Arc<dyn Fn(Vec<Value>) + Send + Sync>;

/// Cancels a subscription when dropped or when [Subscription::unsubscribe] is
/// called
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new<F: FnOnce() + Send + 'static>(cancel: F) -> Subscription {
        Subscription {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Document store holding records as JSON values
pub trait Store {
    fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Value>, ServiceError>;
    fn put(&self, collection: &str, id: &str, record: Value) -> Result<(), ServiceError>;
    /// Call `on_change` with the matching records now and whenever they change
    fn subscribe(&self, collection: &str, filters: &[Filter], on_change: ChangeHandler) -> Subscription;
}

/// Chat channel a notification is pushed to
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyTarget {
    pub bot_token: String,
    pub chat_id: String,
}

/// Fire-and-forget message delivery. Failures are the notifier's to log.
pub trait Notifier {
    fn send(&self, target: &NotifyTarget, message: &str, link: Option<&str>);
}

pub struct LeaveOffice<S, N, A> {
    pub store: S,
    pub notifier: N,
    pub stamper: Stamper<A>,
    pub school_name: String,
    pub director_name: String,
    pub target: NotifyTarget,
    /// Prefix of the link sent with notifications; the request id is appended
    pub link_base: Option<String>,
}

impl<S: Store, N: Notifier, A: AssetFetcher> LeaveOffice<S, N, A> {
    fn request(&self, id: &str) -> Result<LeaveRequest, ServiceError> {
        let record = self
            .store
            .query(LEAVE_REQUESTS, &[Filter::equals("id", id)])?
            .into_iter()
            .next()
            .ok_or_else(|| ServiceError::NotFound {
                collection: LEAVE_REQUESTS.to_string(),
                id: id.to_string(),
            })?;
        Ok(serde_json::from_value(record)?)
    }

    fn staff(&self, request: &LeaveRequest) -> Result<StaffMember, ServiceError> {
        let record = self
            .store
            .query(STAFF, &[Filter::equals("id", request.teacher_id.as_str())])?
            .into_iter()
            .next();
        match record {
            Some(record) => Ok(serde_json::from_value(record)?),
            // a departed teacher still has their forms
            None => Ok(StaffMember {
                id: request.teacher_id.clone(),
                name: request.teacher_name.clone(),
                position: request.position.clone(),
                phone: None,
            }),
        }
    }

    fn history(&self, request: &LeaveRequest) -> Result<Vec<LeaveRequest>, ServiceError> {
        let records = self.store.query(
            LEAVE_REQUESTS,
            &[Filter::equals("teacherId", request.teacher_id.as_str())],
        )?;
        Ok(decode_records(records))
    }

    /// Everything needed to compose the form for a request, with statistics
    /// computed from the teacher's history. Signatures and the emblem can be
    /// added to the result before composing.
    pub fn leave_form_request(&self, request_id: &str) -> Result<LeaveFormRequest, ServiceError> {
        let request = self.request(request_id)?;
        let staff = self.staff(&request)?;
        let stats = LeaveStats::from_history(&request, &self.history(&request)?);
        Ok(LeaveFormRequest::new(
            request,
            stats,
            staff,
            &self.school_name,
            &self.director_name,
        ))
    }

    /// Compose the leave form for a stored request
    pub fn leave_form_for(&self, request_id: &str) -> Result<ComposedDocument, ServiceError> {
        let form = self.leave_form_request(request_id)?;
        Ok(self.stamper.leave_form(&form)?)
    }

    /// Record the director's decision and notify the requester
    pub fn decide(
        &self,
        request_id: &str,
        status: LeaveStatus,
        date: NaiveDate,
    ) -> Result<LeaveRequest, ServiceError> {
        let mut request = self.request(request_id)?;
        request.status = status;
        request.approved_date = Some(date);
        self.store
            .put(LEAVE_REQUESTS, &request.id, serde_json::to_value(&request)?)?;
        log::info!("leave request {} is now {:?}", request.id, status);

        let message = format!(
            "คำขอ{}ของ {} ได้รับการพิจารณาแล้ว: {}",
            request.leave_type.label(),
            request.teacher_name,
            status.label()
        );
        let link = self
            .link_base
            .as_ref()
            .map(|base| format!("{base}{}", request.id));
        self.notifier.send(&self.target, &message, link.as_deref());
        Ok(request)
    }

    /// Follow the pending requests. Records that do not parse are skipped.
    pub fn watch_pending<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(Vec<LeaveRequest>) + Send + Sync + 'static,
    {
        self.store.subscribe(
            LEAVE_REQUESTS,
            &[Filter::equals("status", "pending")],
            Arc::new(move |records| on_change(decode_records(records))),
        )
    }
}

fn decode_records(records: Vec<Value>) -> Vec<LeaveRequest> {
    records
        .into_iter()
        .filter_map(|record| match serde_json::from_value(record) {
            Ok(request) => Some(request),
            Err(e) => {
                log::warn!("skipping malformed leave request: {e}");
                None
            }
        })
        .collect()
}
