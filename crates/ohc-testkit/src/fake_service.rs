//! Deterministic in-memory stand-in for the remote service.

use std::cell::RefCell;

use ohc_execution::{RemoteService, ServiceReply, SubmitBatch, TransportError, WritePermit};
use serde_json::json;

use crate::task_list_body;

/// One recorded interaction, in call order.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    ListTasks,
    Upload {
        hashes: Vec<String>,
        agree_terms: String,
    },
}

/// Replies are fixed up front; every call is recorded.
pub struct FakeOhcService {
    list_reply: Result<ServiceReply, TransportError>,
    upload_reply: Result<ServiceReply, TransportError>,
    calls: RefCell<Vec<Call>>,
}

impl FakeOhcService {
    /// Account already holding `remote_hashes`; uploads are accepted.
    pub fn with_remote<S: AsRef<str>>(remote_hashes: &[S]) -> Self {
        Self {
            list_reply: Ok(ServiceReply::new(200, task_list_body(remote_hashes))),
            upload_reply: Ok(ServiceReply::new(
                200,
                json!({"success": true, "message": "Hashes uploaded"}),
            )),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn list_reply(mut self, reply: Result<ServiceReply, TransportError>) -> Self {
        self.list_reply = reply;
        self
    }

    pub fn upload_reply(mut self, reply: Result<ServiceReply, TransportError>) -> Self {
        self.upload_reply = reply;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn list_count(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::ListTasks))
            .count()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads().len()
    }

    /// Hash payloads of every upload, in call order.
    pub fn uploads(&self) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Upload { hashes, .. } => Some(hashes.clone()),
                Call::ListTasks => None,
            })
            .collect()
    }
}

impl RemoteService for FakeOhcService {
    fn list_tasks(&self) -> Result<ServiceReply, TransportError> {
        self.calls.borrow_mut().push(Call::ListTasks);
        self.list_reply.clone()
    }

    fn upload_hashes(
        &self,
        batch: SubmitBatch,
        _permit: WritePermit,
    ) -> Result<ServiceReply, TransportError> {
        self.calls.borrow_mut().push(Call::Upload {
            hashes: batch.hashes().into_iter().map(str::to_string).collect(),
            agree_terms: batch.agree_terms().to_string(),
        });
        self.upload_reply.clone()
    }
}
