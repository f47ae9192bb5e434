//! Scripted [`Api`] for tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use common::operations::Perform;
use tracerr::Traced;

use super::{Api, Call, Error};

/// [`Api`] replying with pre-scripted responses and recording every [`Call`].
#[derive(Clone, Debug, Default)]
pub(crate) struct Fake {
    /// [`Call`]s received so far.
    calls: Arc<Mutex<Vec<Call>>>,

    /// Replies to give, in order. Exhausted script replies with `null`.
    replies: Arc<Mutex<VecDeque<Result<serde_json::Value, Failure>>>>,
}

/// Scripted failed response.
type Failure = (u16, Option<String>);

impl Fake {
    /// Scripts a successful reply with the provided `body`.
    pub(crate) fn reply(self, body: serde_json::Value) -> Self {
        self.replies.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Scripts a failed reply with the provided `status` and `message`.
    pub(crate) fn fail(self, status: u16, message: Option<&str>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err((status, message.map(ToOwned::to_owned))));
        self
    }

    /// Returns the [`Call`]s received so far.
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl Api<Perform<Call>> for Fake {
    type Ok = serde_json::Value;
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Perform(call): Perform<Call>,
    ) -> Result<Self::Ok, Self::Err> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(body)) => Ok(body),
            Some(Err((status, message))) => {
                Err(tracerr::new!(Error::Status { status, message }))
            }
            None => Ok(serde_json::Value::Null),
        }
    }
}
