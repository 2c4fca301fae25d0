use std::{fmt, time::Duration};

use bson::{Document, doc};
use mongodb::{Client, options::ClientOptions};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Collections the storefront reads and writes. Anything outside this set is
/// not reachable through the data layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Users,
    Orders,
    Categories,
    Reviews,
    Advertisements,
    HeroSlides,
    Testimonials,
    Offers,
    SplitCards,
    AnimatedBanners,
    Cart,
    Wishlist,
}

impl Collection {
    pub const ALL: [Collection; 13] = [
        Collection::Products,
        Collection::Users,
        Collection::Orders,
        Collection::Categories,
        Collection::Reviews,
        Collection::Advertisements,
        Collection::HeroSlides,
        Collection::Testimonials,
        Collection::Offers,
        Collection::SplitCards,
        Collection::AnimatedBanners,
        Collection::Cart,
        Collection::Wishlist,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Users => "users",
            Collection::Orders => "orders",
            Collection::Categories => "categories",
            Collection::Reviews => "reviews",
            Collection::Advertisements => "advertisements",
            Collection::HeroSlides => "hero_slides",
            Collection::Testimonials => "testimonials",
            Collection::Offers => "offers",
            Collection::SplitCards => "split_cards",
            Collection::AnimatedBanners => "animated_banners",
            Collection::Cart => "cart",
            Collection::Wishlist => "wishlist",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to database: {0}")]
    Connection(#[source] mongodb::error::Error),

    #[error("document not found in {collection}")]
    NotFound { collection: Collection },

    #[error("database error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[from] bson::de::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Connection settings. Values given in the URI query string win over the
/// defaults here.
#[derive(Debug, Clone)]
pub struct DbSettings {
    pub uri: SecretString,
    pub database: String,
    pub max_pool_size: u32,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
}

impl DbSettings {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: SecretString::from(uri.into()),
            database: database.into(),
            max_pool_size: 10,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeouts(mut self, connect: Duration, server_selection: Duration) -> Self {
        self.connect_timeout = connect;
        self.server_selection_timeout = server_selection;
        self
    }
}

/// Lazily connected handle to the storefront database.
///
/// The first successful connection is memoized and shared by every caller.
/// A failed attempt is not cached, so the next operation tries again; there
/// is no other reconnect logic.
pub struct Database {
    settings: DbSettings,
    client: OnceCell<Client>,
}

impl Database {
    pub fn new(settings: DbSettings) -> Self {
        Self {
            settings,
            client: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.database
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// Establish the connection now instead of on first use.
    pub async fn init(&self) -> StoreResult<()> {
        self.client().await.map(|_| ())
    }

    async fn client(&self) -> StoreResult<&Client> {
        self.client
            .get_or_try_init(|| async {
                let mut options = ClientOptions::parse(self.settings.uri.expose_secret())
                    .await
                    .map_err(StoreError::Connection)?;
                options.app_name.get_or_insert_with(|| "storefront-api".to_string());
                options.max_pool_size.get_or_insert(self.settings.max_pool_size);
                options
                    .connect_timeout
                    .get_or_insert(self.settings.connect_timeout);
                options
                    .server_selection_timeout
                    .get_or_insert(self.settings.server_selection_timeout);

                let client = Client::with_options(options).map_err(StoreError::Connection)?;
                client
                    .database(&self.settings.database)
                    .run_command(doc! { "ping": 1 })
                    .await
                    .map_err(StoreError::Connection)?;

                tracing::info!(
                    database = %self.settings.database,
                    "database connection established"
                );
                Ok(client)
            })
            .await
    }

    /// Resolve a collection handle on the shared connection.
    pub async fn collection(
        &self,
        collection: Collection,
    ) -> StoreResult<mongodb::Collection<Document>> {
        let client = self.client().await?;
        Ok(client
            .database(&self.settings.database)
            .collection::<Document>(collection.name()))
    }

    /// Round-trip to the server, used by endpoints that check the connection
    /// before serving.
    pub async fn ping(&self) -> StoreResult<()> {
        let client = self.client().await?;
        client
            .database(&self.settings.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(StoreError::Connection)?;
        Ok(())
    }

    /// Drop the whole configured database. Used to clean up scratch databases.
    pub async fn drop_database(&self) -> StoreResult<()> {
        let client = self.client().await?;
        client.database(&self.settings.database).drop().await?;
        tracing::info!(database = %self.settings.database, "database dropped");
        Ok(())
    }

    /// Names of the databases on the server.
    pub async fn list_database_names(&self) -> StoreResult<Vec<String>> {
        let client = self.client().await?;
        Ok(client.list_database_names().await?)
    }

    pub async fn shutdown(&self) {
        if let Some(client) = self.client.get() {
            client.clone().shutdown().await;
            tracing::info!("database connection closed");
        }
    }
}
