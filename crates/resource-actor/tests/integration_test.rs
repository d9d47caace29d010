use async_trait::async_trait;
use resource_actor::{FrameworkError, Query, ResourceActor, ResourceClient, ActorEntity};

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Handle {
    id: u32,
    name: String,
    locked: bool,
    tags: Vec<String>,
}

#[derive(Debug)]
struct HandleCreate {
    name: String,
}

#[derive(Debug)]
struct HandleUpdate {
    name: Option<String>,
}

#[derive(Debug)]
enum HandleAction {
    Lock,
    Tag(String),
    TagThenFail(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum HandleError {
    #[error("handle name is empty")]
    EmptyName,
    #[error("handle is locked")]
    Locked,
    #[error("refused after tagging")]
    Refused,
}

#[async_trait]
impl ActorEntity for Handle {
    type Id = u32;
    type Create = HandleCreate;
    type Update = HandleUpdate;
    type Action = HandleAction;
    type ActionResult = usize;
    type Context = ();
    type Error = HandleError;

    fn from_create_params(id: u32, params: HandleCreate) -> Result<Self, Self::Error> {
        if params.name.trim().is_empty() {
            return Err(HandleError::EmptyName);
        }
        Ok(Self {
            id,
            name: params.name,
            locked: false,
            tags: Vec::new(),
        })
    }

    fn unique_keys(&self) -> Vec<String> {
        let mut keys = vec![format!("name:{}", self.name)];
        keys.extend(self.tags.iter().map(|t| format!("tag:{t}")));
        keys
    }

    async fn on_update(&mut self, update: HandleUpdate, _ctx: &()) -> Result<(), Self::Error> {
        if self.locked {
            return Err(HandleError::Locked);
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        Ok(())
    }

    async fn on_delete(&self, _ctx: &()) -> Result<(), Self::Error> {
        if self.locked {
            return Err(HandleError::Locked);
        }
        Ok(())
    }

    async fn handle_action(&mut self, action: HandleAction, _ctx: &()) -> Result<usize, Self::Error> {
        match action {
            HandleAction::Lock => {
                self.locked = true;
                Ok(self.tags.len())
            }
            HandleAction::Tag(tag) => {
                self.tags.push(tag);
                Ok(self.tags.len())
            }
            HandleAction::TagThenFail(tag) => {
                self.tags.push(tag);
                Err(HandleError::Refused)
            }
        }
    }
}

fn spawn() -> ResourceClient<Handle> {
    let (actor, client) = ResourceActor::new(10);
    tokio::spawn(actor.run(()));
    client
}

fn create(name: &str) -> HandleCreate {
    HandleCreate {
        name: name.to_string(),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_full_lifecycle() {
    let client = spawn();

    let id = client.create(create("amy")).await.unwrap();
    assert_eq!(id, 1);

    let tags = client
        .perform_action(id, HandleAction::Tag("vip".into()))
        .await
        .unwrap();
    assert_eq!(tags, 1);

    let updated = client
        .update(
            id,
            HandleUpdate {
                name: Some("amelia".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "amelia");
    assert_eq!(
        client.lookup("name:amelia".into()).await.unwrap().map(|h| h.id),
        Some(id)
    );
    // the old key is released by the rename
    assert!(client.lookup("name:amy".into()).await.unwrap().is_none());

    client.delete(id).await.unwrap();
    assert!(client.get(id).await.unwrap().is_none());
    assert!(client.lookup("tag:vip".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_rejects_taken_key_and_invalid_payload() {
    let client = spawn();
    client.create(create("amy")).await.unwrap();

    let taken = client.create(create("amy")).await;
    assert!(matches!(taken, Err(FrameworkError::UniqueViolation(ref k)) if k == "name:amy"));

    let invalid = client.create(create("  ")).await.unwrap_err();
    assert_eq!(
        invalid.downcast_entity::<HandleError>().unwrap(),
        HandleError::EmptyName
    );

    let all = client.find(Query::new()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_failed_writes_leave_row_untouched() {
    let client = spawn();
    let a = client.create(create("a")).await.unwrap();
    let b = client.create(create("b")).await.unwrap();
    client
        .perform_action(a, HandleAction::Tag("red".into()))
        .await
        .unwrap();

    // hook error after mutating the staged copy
    let refused = client
        .perform_action(b, HandleAction::TagThenFail("blue".into()))
        .await;
    assert!(matches!(refused, Err(FrameworkError::EntityError(_))));
    assert!(client.get(b).await.unwrap().unwrap().tags.is_empty());
    assert!(client.lookup("tag:blue".into()).await.unwrap().is_none());

    // key owned by another row
    let clash = client
        .perform_action(b, HandleAction::Tag("red".into()))
        .await;
    assert!(matches!(clash, Err(FrameworkError::UniqueViolation(ref k)) if k == "tag:red"));
    assert!(client.get(b).await.unwrap().unwrap().tags.is_empty());

    // duplicate key within the same row
    client
        .perform_action(b, HandleAction::Tag("green".into()))
        .await
        .unwrap();
    let twice = client
        .perform_action(b, HandleAction::Tag("green".into()))
        .await;
    assert!(matches!(twice, Err(FrameworkError::UniqueViolation(_))));
    assert_eq!(client.get(b).await.unwrap().unwrap().tags, vec!["green"]);

    let rename = client
        .update(
            b,
            HandleUpdate {
                name: Some("a".into()),
            },
        )
        .await;
    assert!(matches!(rename, Err(FrameworkError::UniqueViolation(_))));
    assert_eq!(client.get(b).await.unwrap().unwrap().name, "b");
}

#[tokio::test]
async fn test_upsert_is_idempotent_under_concurrency() {
    let client = spawn();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let client = client.clone();
        tasks.push(tokio::spawn(async move {
            client.upsert("name:amy".into(), create("amy")).await
        }));
    }

    let mut created = 0;
    let mut ids = Vec::new();
    for task in tasks {
        let upserted = task.await.unwrap().unwrap();
        if upserted.created {
            created += 1;
        }
        ids.push(upserted.item.id);
    }
    assert_eq!(created, 1);
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(client.find(Query::new()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_find_orders_and_limits() {
    let client = spawn();
    for name in ["carl", "amy", "bea", "dan"] {
        client.create(create(name)).await.unwrap();
    }

    let insertion: Vec<String> = client
        .find(Query::new())
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(insertion, vec!["carl", "amy", "bea", "dan"]);

    let sorted: Vec<String> = client
        .find(
            Query::new()
                .filter(|h: &Handle| h.name != "dan")
                .order_by(|a: &Handle, b: &Handle| a.name.cmp(&b.name))
                .limit(2),
        )
        .await
        .unwrap()
        .into_iter()
        .map(|h| h.name)
        .collect();
    assert_eq!(sorted, vec!["amy", "bea"]);
}

#[tokio::test]
async fn test_delete_guarded_by_hook_and_missing_rows() {
    let client = spawn();
    let id = client.create(create("amy")).await.unwrap();
    client.perform_action(id, HandleAction::Lock).await.unwrap();

    assert!(matches!(
        client.delete(id).await,
        Err(FrameworkError::EntityError(_))
    ));
    assert!(client.get(id).await.unwrap().is_some());

    assert!(matches!(
        client.delete(42).await,
        Err(FrameworkError::NotFound(_))
    ));
    assert!(matches!(
        client.update(42, HandleUpdate { name: None }).await,
        Err(FrameworkError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_closed_actor_reports_actor_closed() {
    let (actor, client) = ResourceActor::<Handle>::new(1);
    drop(actor);
    assert!(matches!(
        client.get(1).await,
        Err(FrameworkError::ActorClosed)
    ));
}
