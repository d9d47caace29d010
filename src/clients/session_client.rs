use crate::error::Precondition;
use crate::model::{
    CaptureSession, Session, SessionCreate, SessionId, SessionKind, SessionUpdate,
    OPEN_SESSION_KEY,
};
use crate::session_actor::{SessionAction, SessionError};
use async_trait::async_trait;
use resource_actor::{ActorClient, FrameworkError, Query, ResourceClient};
use tracing::{debug, info, instrument};

/// Client for the Session actor.
#[derive(Clone)]
pub struct SessionClient {
    inner: ResourceClient<Session>,
}

impl SessionClient {
    pub fn new(inner: ResourceClient<Session>) -> Self {
        Self { inner }
    }

    /// Opens a session. A blank name gets the dated default name.
    ///
    /// Fails with `AlreadyOpen` while another session is open.
    #[instrument(skip(self))]
    pub async fn open_session(
        &self,
        kind: SessionKind,
        name: Option<String>,
    ) -> Result<Session, SessionError> {
        let id = self
            .inner
            .create(SessionCreate { kind, name })
            .await
            .map_err(Self::map_error)?;
        let session = self.require(id).await?;
        info!(session_id = %id, name = %session.name, "Session opened");
        Ok(session)
    }

    #[instrument(skip(self))]
    pub async fn close_session(&self, id: SessionId) -> Result<Session, SessionError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, SessionAction::Close)
            .await
            .map_err(Self::map_error)
    }

    /// The open session, if any.
    #[instrument(skip(self))]
    pub async fn current_session(&self) -> Result<Option<Session>, SessionError> {
        self.inner
            .lookup(OPEN_SESSION_KEY.to_string())
            .await
            .map_err(Self::map_error)
    }

    /// Most recently opened first.
    #[instrument(skip(self))]
    pub async fn recent_sessions(&self, limit: usize) -> Result<Vec<Session>, SessionError> {
        self.find(
            Query::new()
                .order_by(|a: &Session, b: &Session| {
                    b.opened_at.cmp(&a.opened_at).then(b.id.cmp(&a.id))
                })
                .limit(limit),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn rename(&self, id: SessionId, name: &str) -> Result<Session, SessionError> {
        self.inner
            .update(
                id,
                SessionUpdate {
                    name: name.to_string(),
                },
            )
            .await
            .map_err(Self::map_error)
    }

    /// The capture context for an open session.
    #[instrument(skip(self))]
    pub async fn capture_session(&self, id: SessionId) -> Result<CaptureSession, SessionError> {
        let session = self.require(id).await?;
        if !session.is_open() {
            return Err(Precondition::SessionClosed(id).into());
        }
        Ok(session.capture())
    }

    pub async fn require(&self, id: SessionId) -> Result<Session, SessionError> {
        self.get(id)
            .await?
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl ActorClient<Session> for SessionClient {
    type Error = SessionError;

    fn inner(&self) -> &ResourceClient<Session> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::NotFound(id) => SessionError::NotFound(id),
            FrameworkError::UniqueViolation(_) => SessionError::AlreadyOpen,
            other => other
                .downcast_entity::<SessionError>()
                .unwrap_or_else(|e| SessionError::ActorCommunicationError(e.to_string())),
        }
    }
}
