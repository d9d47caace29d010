//! Entity trait implementation for the Session domain type.

use super::{SessionAction, SessionError};
use crate::error::Precondition;
use crate::model::{
    clean_name, default_session_name, Session, SessionCreate, SessionId, SessionStatus,
    SessionUpdate, OPEN_SESSION_KEY,
};
use async_trait::async_trait;
use chrono::{Local, Utc};
use resource_actor::ActorEntity;

#[async_trait]
impl ActorEntity for Session {
    type Id = SessionId;
    type Create = SessionCreate;
    type Update = SessionUpdate;
    type Action = SessionAction;
    type ActionResult = Session;
    type Context = ();
    type Error = SessionError;

    fn from_create_params(id: SessionId, params: SessionCreate) -> Result<Self, Self::Error> {
        let name = params
            .name
            .as_deref()
            .and_then(clean_name)
            .unwrap_or_else(|| default_session_name(params.kind, Local::now().naive_local()));
        Ok(Self {
            id,
            name,
            kind: params.kind,
            status: SessionStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
        })
    }

    fn unique_keys(&self) -> Vec<String> {
        if self.is_open() {
            vec![OPEN_SESSION_KEY.to_string()]
        } else {
            Vec::new()
        }
    }

    async fn on_update(&mut self, update: SessionUpdate, _ctx: &()) -> Result<(), Self::Error> {
        self.name = clean_name(&update.name).ok_or(SessionError::EmptyName)?;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: SessionAction,
        _ctx: &(),
    ) -> Result<Session, Self::Error> {
        match action {
            SessionAction::Close => {
                if !self.is_open() {
                    return Err(Precondition::SessionClosed(self.id).into());
                }
                self.status = SessionStatus::Closed;
                self.closed_at = Some(Utc::now());
                Ok(self.clone())
            }
        }
    }
}
