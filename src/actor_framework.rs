use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Params, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by [`ResourceActor`].
///
/// The actor owns the only copy of every entity. Callers always receive clones,
/// and every mutation runs against a working copy that is committed only when the
/// hook returns `Ok`.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    type Error: std::error::Error + From<FrameworkError> + Send + Sync + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Key chosen by the caller instead of the generated id.
    ///
    /// When present, a second create with the same key fails with
    /// [`FrameworkError::AlreadyExists`].
    fn natural_id(_params: &Self::CreateParams) -> Option<Self::Id> {
        None
    }

    /// Construct the full Entity from the ID and creation params
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    /// Secondary key that must be unique across the store.
    fn unique_key(&self) -> Option<String> {
        None
    }

    // --- Lifecycle Hooks ---

    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures raised by the framework itself rather than by an entity hook.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, E>>;

/// Predicate evaluated inside the actor for [`ResourceRequest::List`].
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    FindByKey {
        key: String,
        respond_to: Response<Option<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    insertion_order: Vec<T::Id>,
    unique_index: HashMap<String, T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            insertion_order: Vec::new(),
            unique_index: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    pub async fn run(mut self) {
        let entity = short_type_name::<T>();
        info!(entity, "ResourceActor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::FindByKey { key, respond_to } => {
                    let item = self
                        .unique_index
                        .get(&key)
                        .and_then(|id| self.store.get(id))
                        .cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self
                        .insertion_order
                        .iter()
                        .filter_map(|id| self.store.get(id))
                        .filter(|item| filter(*item))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
            }
        }

        info!(entity, "ResourceActor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, T::Error> {
        let id = T::natural_id(&params).unwrap_or_else(|| (self.next_id_fn)());
        if self.store.contains_key(&id) {
            warn!(%id, "Rejected create: id already taken");
            return Err(FrameworkError::AlreadyExists(id.to_string()).into());
        }

        let item = T::from_create_params(id.clone(), params)?;
        if let Some(key) = item.unique_key() {
            if self.unique_index.contains_key(&key) {
                warn!(%id, "Rejected create: unique key already taken");
                return Err(FrameworkError::AlreadyExists(key).into());
            }
            self.unique_index.insert(key, id.clone());
        }

        debug!(%id, "Item created");
        self.insertion_order.push(id.clone());
        self.store.insert(id.clone(), item);
        Ok(id)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        let mut working = self.working_copy(&id)?;
        working.on_update(patch)?;
        self.commit(id, working.clone())?;
        Ok(working)
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, T::Error> {
        let mut working = self.working_copy(&id)?;
        let result = working.handle_action(action)?;
        self.commit(id, working)?;
        Ok(result)
    }

    fn working_copy(&self, id: &T::Id) -> Result<T, T::Error> {
        self.store
            .get(id)
            .cloned()
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()).into())
    }

    fn commit(&mut self, id: T::Id, item: T) -> Result<(), T::Error> {
        let old_key = self.store.get(&id).and_then(|current| current.unique_key());
        let new_key = item.unique_key();
        if old_key != new_key {
            if let Some(key) = &new_key {
                if self.unique_index.contains_key(key) {
                    return Err(FrameworkError::AlreadyExists(key.clone()).into());
                }
            }
            if let Some(key) = old_key {
                self.unique_index.remove(&key);
            }
            if let Some(key) = new_key {
                self.unique_index.insert(key, id.clone());
            }
        }
        self.store.insert(id, item);
        Ok(())
    }
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, T::Error> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| T::Error::from(FrameworkError::ActorClosed))?;
        response
            .await
            .map_err(|_| T::Error::from(FrameworkError::ActorDropped))?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, T::Error> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn find_by_key(&self, key: String) -> Result<Option<T>, T::Error> {
        self.request(|respond_to| ResourceRequest::FindByKey { key, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, T::Error> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, T::Error> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }

    pub async fn list(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, T::Error> {
        let filter: Filter<T> = Box::new(filter);
        self.request(|respond_to| ResourceRequest::List { filter, respond_to })
            .await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Debug, Clone, Error, PartialEq)]
    enum TicketError {
        #[error(transparent)]
        Framework(#[from] FrameworkError),
        #[error("ticket is closed")]
        Closed,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: String,
        owner: String,
        open: bool,
        notes: Vec<String>,
    }

    #[derive(Debug)]
    struct TicketCreate {
        slug: Option<String>,
        owner: String,
    }

    #[derive(Debug)]
    struct TicketPatch {
        owner: String,
    }

    #[derive(Debug)]
    enum TicketAction {
        Note(String),
        Close,
    }

    impl Entity for Ticket {
        type Id = String;
        type CreateParams = TicketCreate;
        type Patch = TicketPatch;
        type Action = TicketAction;
        type ActionResult = usize;
        type Error = TicketError;

        fn id(&self) -> &String {
            &self.id
        }

        fn natural_id(params: &TicketCreate) -> Option<String> {
            params.slug.clone()
        }

        fn from_create_params(id: String, params: TicketCreate) -> Result<Self, TicketError> {
            Ok(Self {
                id,
                owner: params.owner,
                open: true,
                notes: Vec::new(),
            })
        }

        fn unique_key(&self) -> Option<String> {
            Some(self.owner.to_lowercase())
        }

        fn on_update(&mut self, patch: TicketPatch) -> Result<(), TicketError> {
            self.owner = patch.owner;
            Ok(())
        }

        fn handle_action(&mut self, action: TicketAction) -> Result<usize, TicketError> {
            match action {
                TicketAction::Note(note) => {
                    self.notes.push(note);
                    if !self.open {
                        return Err(TicketError::Closed);
                    }
                    Ok(self.notes.len())
                }
                TicketAction::Close => {
                    self.open = false;
                    Ok(self.notes.len())
                }
            }
        }
    }

    fn spawn_tickets() -> ResourceClient<Ticket> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("ticket_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    fn create(owner: &str) -> TicketCreate {
        TicketCreate {
            slug: None,
            owner: owner.into(),
        }
    }

    // --- Test ---

    #[tokio::test]
    async fn test_resource_actor_with_actions() {
        let client = spawn_tickets();

        let id = client.create(create("alice")).await.unwrap();
        assert_eq!(id, "ticket_1");

        let count = client
            .perform_action(id.clone(), TicketAction::Note("first".into()))
            .await
            .unwrap();
        assert_eq!(count, 1);

        let ticket = client.get(id.clone()).await.unwrap().unwrap();
        assert_eq!(ticket.notes, vec!["first".to_string()]);
    }

    #[tokio::test]
    async fn rejected_action_leaves_stored_item_untouched() {
        let client = spawn_tickets();
        let id = client.create(create("alice")).await.unwrap();
        client.perform_action(id.clone(), TicketAction::Close).await.unwrap();

        let err = client
            .perform_action(id.clone(), TicketAction::Note("late".into()))
            .await
            .unwrap_err();
        assert_eq!(err, TicketError::Closed);

        let ticket = client.get(id).await.unwrap().unwrap();
        assert!(ticket.notes.is_empty());
    }

    #[tokio::test]
    async fn unique_key_and_natural_id_are_enforced() {
        let client = spawn_tickets();
        client.create(create("Alice")).await.unwrap();

        let err = client.create(create("ALICE")).await.unwrap_err();
        assert_eq!(
            err,
            TicketError::Framework(FrameworkError::AlreadyExists("alice".into()))
        );

        let slugged = TicketCreate {
            slug: Some("fixed".into()),
            owner: "bob".into(),
        };
        assert_eq!(client.create(slugged).await.unwrap(), "fixed");
        let again = TicketCreate {
            slug: Some("fixed".into()),
            owner: "carol".into(),
        };
        assert!(matches!(
            client.create(again).await,
            Err(TicketError::Framework(FrameworkError::AlreadyExists(_)))
        ));

        let found = client.find_by_key("bob".into()).await.unwrap().unwrap();
        assert_eq!(found.id, "fixed");
    }

    #[tokio::test]
    async fn update_moves_unique_key() {
        let client = spawn_tickets();
        let id = client.create(create("alice")).await.unwrap();
        client.create(create("bob")).await.unwrap();

        let clash = client
            .update(id.clone(), TicketPatch { owner: "bob".into() })
            .await;
        assert!(matches!(
            clash,
            Err(TicketError::Framework(FrameworkError::AlreadyExists(_)))
        ));

        client
            .update(id.clone(), TicketPatch { owner: "dave".into() })
            .await
            .unwrap();
        assert!(client.find_by_key("alice".into()).await.unwrap().is_none());
        assert_eq!(
            client.find_by_key("dave".into()).await.unwrap().unwrap().id,
            id
        );
    }

    #[tokio::test]
    async fn list_filters_in_insertion_order() {
        let client = spawn_tickets();
        for owner in ["a", "b", "c", "d"] {
            client.create(create(owner)).await.unwrap();
        }
        client
            .perform_action("ticket_2".into(), TicketAction::Close)
            .await
            .unwrap();

        let open: Vec<String> = client
            .list(|t: &Ticket| t.open)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.owner)
            .collect();
        assert_eq!(open, vec!["a", "c", "d"]);
    }

    #[tokio::test]
    async fn missing_item_and_closed_actor() {
        let client = spawn_tickets();
        let err = client.update("nope".into(), TicketPatch { owner: "x".into() }).await;
        assert_eq!(
            err,
            Err(TicketError::Framework(FrameworkError::NotFound("nope".into())))
        );

        let (actor, client) = ResourceActor::<Ticket>::new(1, || "x".to_string());
        drop(actor);
        assert_eq!(
            client.get("x".into()).await,
            Err(TicketError::Framework(FrameworkError::ActorClosed))
        );
    }
}
