//! [`Query`] for reading the persisted [`Session`] record.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Session;
use crate::{
    domain::session::{StoredUser, Token, Validity},
    infra::{
        storage::{self, Key, Scope, Slot},
        Storage,
    },
    Service,
};

use super::Query;

/// [`Query`] for reading the persisted [`Session`] record and deciding
/// whether it's valid.
///
/// Only the local [`Storage`] is consulted, the [`Token`] is never verified
/// by the API.
#[derive(Clone, Copy, Debug)]
pub struct ReadSession;

impl ReadSession {
    /// [`Slot`]s probed for an access [`Token`], in order.
    const TOKEN_SLOTS: [Slot; 4] = [
        Slot::new(Scope::Durable, Key::AccessToken),
        Slot::new(Scope::Durable, Key::Token),
        Slot::new(Scope::Ephemeral, Key::AccessToken),
        Slot::new(Scope::Ephemeral, Key::Token),
    ];

    /// [`Slot`]s probed for a user record, in order.
    const USER_SLOTS: [Slot; 2] = [
        Slot::new(Scope::Durable, Key::User),
        Slot::new(Scope::Ephemeral, Key::User),
    ];

    /// [`Slot`]s probed for a role, in order.
    const ROLE_SLOTS: [Slot; 2] = [
        Slot::new(Scope::Durable, Key::UserRole),
        Slot::new(Scope::Ephemeral, Key::UserRole),
    ];
}

impl<St, Ap> Query<ReadSession> for Service<St, Ap>
where
    St: Storage<
        Select<By<Option<String>, Slot>>,
        Ok = Option<String>,
        Err = Traced<storage::Error>,
    >,
{
    type Ok = Validity;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: ReadSession) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let token = first(self.storage(), ReadSession::TOKEN_SLOTS, |v| {
            Token::from(v).is_plausible()
        })
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .map(Token::from);

        let user = first(self.storage(), ReadSession::USER_SLOTS, |_| true)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map_or(StoredUser::Blank, |raw| StoredUser::parse(&raw));

        let role = match user.user().and_then(|u| u.role.clone()) {
            Some(role) => Some(role),
            None => first(self.storage(), ReadSession::ROLE_SLOTS, |_| true)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .map(Into::into),
        };

        Ok(Validity { token, user, role })
    }
}

/// Returns the first non-empty value among the provided [`Slot`]s which is
/// `accept`ed.
async fn first<St>(
    storage: &St,
    slots: impl IntoIterator<Item = Slot>,
    accept: impl Fn(&str) -> bool,
) -> Result<Option<String>, Traced<storage::Error>>
where
    St: Storage<
        Select<By<Option<String>, Slot>>,
        Ok = Option<String>,
        Err = Traced<storage::Error>,
    >,
{
    for slot in slots {
        let value = storage.execute(Select(By::new(slot))).await?;
        if let Some(v) = value.filter(|v| !v.is_empty() && accept(v)) {
            return Ok(Some(v));
        }
    }
    Ok(None)
}

/// Error of [`ReadSession`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Storage`] error.
    #[display("`Storage` operation failed: {_0}")]
    Storage(storage::Error),
}

#[cfg(test)]
mod spec {
    use common::{operations::Insert, Handler as _};

    use super::ReadSession;
    use crate::{
        domain::session::StoredUser,
        infra::{
            api::fake::Fake,
            storage::{Entry, Key, Scope, Slot},
            Local,
        },
        Config, Service,
    };

    async fn service(entries: &[(Scope, Key, &str)]) -> Service<Local, Fake> {
        let storage = Local::in_memory();
        for (scope, key, value) in entries {
            storage
                .execute(Insert(Entry {
                    slot: Slot::new(*scope, *key),
                    value: (*value).to_owned(),
                }))
                .await
                .unwrap();
        }
        Service::new(Config::default(), storage, Fake::default())
    }

    const TOKEN: &str = "abcdefghijk";
    const USER: &str = r#"{"_id":"u1","role":"Admin"}"#;

    #[tokio::test]
    async fn nothing_stored_is_invalid() {
        let v = service(&[]).await.execute(ReadSession).await.unwrap();

        assert!(v.token.is_none());
        assert_eq!(v.user, StoredUser::Blank);
        assert!(!v.is_valid());
    }

    #[tokio::test]
    async fn short_tokens_are_invalid_in_every_slot() {
        let short = "abcdefghij";
        let v = service(&[
            (Scope::Durable, Key::AccessToken, short),
            (Scope::Durable, Key::Token, short),
            (Scope::Ephemeral, Key::AccessToken, short),
            (Scope::Ephemeral, Key::Token, short),
            (Scope::Durable, Key::User, USER),
            (Scope::Ephemeral, Key::User, USER),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();

        assert!(v.token.is_none());
        assert!(v.user.is_present());
        assert!(!v.is_valid());
    }

    #[tokio::test]
    async fn token_and_user_may_come_from_different_scopes() {
        let durable_token = service(&[
            (Scope::Durable, Key::AccessToken, TOKEN),
            (Scope::Ephemeral, Key::User, USER),
        ])
        .await;
        let ephemeral_token = service(&[
            (Scope::Ephemeral, Key::Token, TOKEN),
            (Scope::Durable, Key::User, USER),
        ])
        .await;

        for svc in [durable_token, ephemeral_token] {
            assert!(svc.execute(ReadSession).await.unwrap().is_valid());
        }
    }

    #[tokio::test]
    async fn probes_legacy_token_key() {
        let v = service(&[
            (Scope::Durable, Key::AccessToken, "short"),
            (Scope::Durable, Key::Token, "legacy-token-value"),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();

        assert_eq!(v.token.unwrap().as_str(), "legacy-token-value");
    }

    #[tokio::test]
    async fn malformed_user_still_counts() {
        let v = service(&[
            (Scope::Durable, Key::AccessToken, TOKEN),
            (Scope::Durable, Key::User, "[object Object]"),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();

        assert_eq!(v.user, StoredUser::Malformed("[object Object]".into()));
        assert!(v.is_valid());
    }

    #[tokio::test]
    async fn empty_user_is_invalid() {
        let v = service(&[
            (Scope::Durable, Key::AccessToken, TOKEN),
            (Scope::Durable, Key::User, ""),
            (Scope::Ephemeral, Key::User, ""),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();

        assert!(v.token.is_some());
        assert!(!v.is_valid());
    }

    #[tokio::test]
    async fn empty_durable_user_falls_through_to_ephemeral() {
        let v = service(&[
            (Scope::Durable, Key::AccessToken, TOKEN),
            (Scope::Durable, Key::User, ""),
            (Scope::Ephemeral, Key::User, USER),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();

        assert!(v.is_valid());
    }

    #[tokio::test]
    async fn resolves_role_from_user_then_stored_role() {
        let from_user = service(&[
            (Scope::Durable, Key::User, USER),
            (Scope::Durable, Key::UserRole, "user"),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();
        assert_eq!(from_user.role.unwrap().as_str(), "Admin");

        let from_key = service(&[
            (Scope::Durable, Key::User, "garbage"),
            (Scope::Ephemeral, Key::UserRole, "super_admin"),
        ])
        .await
        .execute(ReadSession)
        .await
        .unwrap();
        assert_eq!(from_key.role.unwrap().as_str(), "super_admin");
    }
}
