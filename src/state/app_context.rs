use std::sync::Arc;

use crate::application::events::TopicEventBus;
use crate::application::services::BoardNotifier;
use crate::config::AppConfig;
use crate::infrastructure::database::InMemoryActivityRepository;
use crate::infrastructure::logging::BoundaryLogger;

pub type AppBoardNotifier = BoardNotifier<InMemoryActivityRepository, TopicEventBus>;

/// AppContext - DI container shared by every handler and worker
///
/// One bus per process. Cloning the context clones handles, never the bus.
#[derive(Clone)]
pub struct AppContext {
    // Services (Application Layer)
    pub board_notifier: Arc<AppBoardNotifier>,

    // Repositories (Infrastructure Layer)
    pub activity_repo: Arc<InMemoryActivityRepository>,

    // Infrastructure
    pub event_bus: TopicEventBus,
    pub logger: Arc<BoundaryLogger>,

    // Config
    pub config: Arc<AppConfig>,
}

impl AppContext {
    /// Create a new AppContext with all dependencies wired up
    pub fn new(config: AppConfig) -> Self {
        // 1. Create Repositories
        let activity_repo = Arc::new(InMemoryActivityRepository::with_retention(
            config.activity_retention,
        ));

        // 2. Create Infrastructure components
        let logger = Arc::new(BoundaryLogger::new());
        let event_bus = TopicEventBus::new(config.mailbox_capacity, logger.clone());

        // 3. Create Services with dependency injection
        let board_notifier = Arc::new(AppBoardNotifier::new(
            activity_repo.clone(),
            event_bus.clone(),
            logger.clone(),
        ));

        Self {
            board_notifier,
            activity_repo,
            event_bus,
            logger,
            config: Arc::new(config),
        }
    }
}
