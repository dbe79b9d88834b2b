//! Access check shared by the app-scoped endpoints.
//!
//! A user may act on an app iff they own it or appear in its assigned-user
//! set.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::entities::app_users::{self, Entity as AppUsers};
use crate::entities::apps;

pub async fn can_access_app(
    db: &DatabaseConnection,
    app: &apps::Model,
    user_id: i32,
) -> Result<bool, DbErr> {
    if app.owner_id == user_id {
        return Ok(true);
    }

    let assigned = AppUsers::find()
        .filter(app_users::Column::AppId.eq(app.id))
        .filter(app_users::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(assigned.is_some())
}
