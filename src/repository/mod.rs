pub mod repository_error;
pub mod user_repo;
pub mod verification_repo;
pub mod permission_repo;
pub mod role_repo;
pub mod medical_record_repo;
pub mod appointment_repo;

use bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};
use tracing::info;

use crate::config::MongoConfig;

pub const USERS_COLLECTION: &str = "users";
pub const AUTHENTICATION_COLLECTION: &str = "authentication";
pub const PERMISSIONS_COLLECTION: &str = "permissions";
pub const ROLES_COLLECTION: &str = "roles";
pub const MEDICAL_RECORDS_COLLECTION: &str = "medical_records";
pub const APPOINTMENTS_COLLECTION: &str = "appointments";

/// Single database handle constructed at startup and injected into every
/// repository. Queries assume collections exist; an uninitialized
/// database simply yields empty results on read paths.
#[derive(Clone)]
pub struct MongoStore {
    pub database: Database,
}

impl MongoStore {
    pub async fn connect(config: &MongoConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;
        client_options.app_name = Some("MediDiagnoseBackend".to_string());
        client_options.max_pool_size = Some(config.pool_size);
        client_options.connect_timeout = Some(std::time::Duration::from_secs(
            config.connection_timeout_secs,
        ));
        let client = Client::with_options(client_options)?;
        let database = client.database(&config.database);
        Ok(MongoStore { database })
    }

    /// Idempotent index initialization, run once at process start. The
    /// unique indexes back the duplicate-email and duplicate-name 409s.
    pub async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        info!("Ensuring MongoDB indexes");

        let unique = |keys: bson::Document| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };

        self.database
            .collection::<bson::Document>(USERS_COLLECTION)
            .create_index(unique(doc! { "email": 1 }), None)
            .await?;
        self.database
            .collection::<bson::Document>(PERMISSIONS_COLLECTION)
            .create_index(unique(doc! { "name": 1 }), None)
            .await?;
        self.database
            .collection::<bson::Document>(ROLES_COLLECTION)
            .create_index(unique(doc! { "name": 1 }), None)
            .await?;
        self.database
            .collection::<bson::Document>(AUTHENTICATION_COLLECTION)
            .create_index(
                IndexModel::builder().keys(doc! { "auth_code": 1 }).build(),
                None,
            )
            .await?;
        self.database
            .collection::<bson::Document>(MEDICAL_RECORDS_COLLECTION)
            .create_index(
                IndexModel::builder().keys(doc! { "created_at": -1 }).build(),
                None,
            )
            .await?;

        info!("MongoDB indexes ready");
        Ok(())
    }
}
