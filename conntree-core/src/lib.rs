//! `ConnTree` Core Library
//!
//! This crate provides the UI-free core of the `ConnTree` connection tree control,
//! including the observable tree model, view refresh translation, node commands,
//! drag-and-drop policy, configuration and persistence.

pub mod config;
pub mod connection_tree;
pub mod dispatch;
pub mod drop_policy;
pub mod error;
pub mod external;
pub mod models;
pub mod persistence;
pub mod search;
pub mod subscription;
pub mod translator;
pub mod tree;
pub mod view;

pub use config::{ConfigManager, LoggingSettings, TreeBehavior, TreeSettings};
pub use connection_tree::{
    CellClick, ClickAction, ClickHandlerChain, ConnectionTree, DeletionConfirmer, ExpandRootNode,
    PostAttachAction, RestoreExpandedContainers, SelectRootNode, SelectionListener,
};
pub use dispatch::{UiHandle, UiQueue, UiRequest};
pub use drop_policy::{DropPolicy, DropPosition, DropRejection, DropRequest, ValidatedDrop};
pub use error::{ConfigError, ConfigResult, ModelError, ModelResult, TreeError, TreeResult};
pub use external::{ExternalFeed, SessionFeed};
pub use models::{
    ConnectionSettings, DefaultTemplates, Inheritance, NodeDefaults, NodeId, NodeKind, NodeRole,
    ProtocolType, TreeNode,
};
pub use persistence::{run_save_worker, spawn_save_worker, NoOpSaver, SaveRequester, SnapshotSaver};
pub use search::{NodeSearcher, SearchError, SearchResult};
pub use subscription::{Subscribers, SubscriptionToken};
pub use translator::{refreshes_on, translate, translate_property, RefreshScope};
pub use tree::{
    ChangeAction, CollectionChange, ConnectionTreeModel, ModelHandle, ModelSlot, NodeProperty,
    Placement, PropertyChange, PropertyUpdate, SortOrder, TreeSnapshot,
};
pub use view::{RecordingView, TreeView, ViewCall};
