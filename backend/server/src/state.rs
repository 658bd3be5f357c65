use std::sync::Arc;

use crate::{
    config::Config,
    database::{Datastore, StorageError},
    mailer::{Notifier, SmtpNotifier},
};

pub struct AppState {
    pub config: Config,
    pub store: Datastore,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<Self>, StorageError> {
        let notifier = Arc::new(SmtpNotifier::from_config(&config));

        Self::with_notifier(config, notifier)
    }

    /// Initializes the contacts table before handing out the state.
    pub fn with_notifier(
        config: Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Arc<Self>, StorageError> {
        let store = Datastore::new(config.database_path.clone());
        store.init()?;

        Ok(Arc::new(Self {
            config,
            store,
            notifier,
        }))
    }
}
