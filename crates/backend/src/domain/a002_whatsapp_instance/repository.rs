use anyhow::Result;
use contracts::domain::a002_whatsapp_instance::aggregate::{InstanceStatus, WhatsappInstance};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use uuid::Uuid;

mod whatsapp_instance {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
    #[sea_orm(table_name = "whatsapp_instances")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub name: String,
        pub user_id: String,
        pub status: String,
        pub qr_code: Option<String>,
        pub phone_number: Option<String>,
        pub last_error: Option<String>,
        pub updated_at: DateTimeUtc,
        pub version: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

use whatsapp_instance::{ActiveModel, Column, Entity};

impl TryFrom<whatsapp_instance::Model> for WhatsappInstance {
    type Error = anyhow::Error;

    fn try_from(m: whatsapp_instance::Model) -> Result<Self> {
        Ok(WhatsappInstance {
            id: Uuid::parse_str(&m.id)?,
            name: m.name,
            user_id: m.user_id,
            status: InstanceStatus::from_str(&m.status).map_err(|e| anyhow::anyhow!(e))?,
            qr_code: m.qr_code,
            phone_number: m.phone_number,
            last_error: m.last_error,
            updated_at: m.updated_at,
            version: m.version,
        })
    }
}

fn to_active_model(i: &WhatsappInstance) -> ActiveModel {
    ActiveModel {
        id: Set(i.id.to_string()),
        name: Set(i.name.clone()),
        user_id: Set(i.user_id.clone()),
        status: Set(i.status.as_str().to_string()),
        qr_code: Set(i.qr_code.clone()),
        phone_number: Set(i.phone_number.clone()),
        last_error: Set(i.last_error.clone()),
        updated_at: Set(i.updated_at),
        version: Set(i.version),
    }
}

pub async fn insert(db: &DatabaseConnection, instance: &WhatsappInstance) -> Result<()> {
    Entity::insert(to_active_model(instance)).exec(db).await?;
    Ok(())
}

/// Returns false when another writer bumped the version first
pub async fn update(
    db: &DatabaseConnection,
    instance: &WhatsappInstance,
    expected_version: i32,
) -> Result<bool> {
    let result = Entity::update_many()
        .set(to_active_model(instance))
        .filter(Column::Id.eq(instance.id.to_string()))
        .filter(Column::Version.eq(expected_version))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

pub async fn get_by_id(db: &DatabaseConnection, id: &Uuid) -> Result<Option<WhatsappInstance>> {
    match Entity::find_by_id(id.to_string()).one(db).await? {
        Some(model) => Ok(Some(model.try_into()?)),
        None => Ok(None),
    }
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<WhatsappInstance>> {
    let models = Entity::find().order_by_asc(Column::Name).all(db).await?;
    models.into_iter().map(WhatsappInstance::try_from).collect()
}
