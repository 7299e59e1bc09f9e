//! Users, roles and access grants.

use crate::access::AccessScope;
use crate::entities::{prelude::*, roles, user_access, users, warehouses};
use crate::models::user::{CreateRole, CreateUser};
use sea_orm::*;
use tracing::debug;

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<users::Model>, DbErr> {
    Users::find().order_by_asc(users::Column::FullName).all(db).await
}

pub async fn get_by_id(db: &DatabaseConnection, id: i32) -> Result<Option<users::Model>, DbErr> {
    Users::find_by_id(id).one(db).await
}

pub async fn get_by_login(db: &DatabaseConnection, login: &str) -> Result<Option<users::Model>, DbErr> {
    Users::find()
        .filter(users::Column::Login.eq(login))
        .one(db)
        .await
}

pub async fn create(db: &DatabaseConnection, data: CreateUser) -> Result<users::Model, DbErr> {
    let model = users::ActiveModel {
        login: Set(data.login),
        full_name: Set(data.full_name),
        role_id: Set(data.role_id),
        is_active: Set(true),
        ..Default::default()
    };
    model.insert(db).await
}

/// Activate or deactivate a user. Returns None when the user is unknown.
pub async fn set_active(db: &DatabaseConnection, id: i32, is_active: bool) -> Result<Option<users::Model>, DbErr> {
    let Some(model) = Users::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut active: users::ActiveModel = model.into();
    active.is_active = Set(is_active);
    Ok(Some(active.update(db).await?))
}

pub async fn list_roles(db: &DatabaseConnection) -> Result<Vec<roles::Model>, DbErr> {
    Roles::find().order_by_asc(roles::Column::Name).all(db).await
}

pub async fn create_role(db: &DatabaseConnection, data: CreateRole) -> Result<roles::Model, DbErr> {
    let model = roles::ActiveModel {
        name: Set(data.name),
        is_admin: Set(data.is_admin),
        ..Default::default()
    };
    model.insert(db).await
}

pub async fn list_grants(db: &DatabaseConnection, user_id: i32) -> Result<Vec<user_access::Model>, DbErr> {
    UserAccess::find()
        .filter(user_access::Column::UserId.eq(user_id))
        .order_by_asc(user_access::Column::Id)
        .all(db)
        .await
}

/// Grant access to a whole department.
pub async fn grant_department(
    db: &DatabaseConnection,
    user_id: i32,
    department_id: i32,
) -> Result<user_access::Model, DbErr> {
    user_access::ActiveModel {
        user_id: Set(user_id),
        department_id: Set(Some(department_id)),
        warehouse_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Grant access to a single warehouse.
pub async fn grant_warehouse(
    db: &DatabaseConnection,
    user_id: i32,
    warehouse_id: i32,
) -> Result<user_access::Model, DbErr> {
    user_access::ActiveModel {
        user_id: Set(user_id),
        department_id: Set(None),
        warehouse_id: Set(Some(warehouse_id)),
        ..Default::default()
    }
    .insert(db)
    .await
}

pub async fn revoke(db: &DatabaseConnection, grant_id: i32) -> Result<bool, DbErr> {
    let result = UserAccess::delete_by_id(grant_id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Create an admin role and user on an empty database.
///
/// Returns None without touching anything once any user exists.
pub async fn bootstrap_admin(db: &DatabaseConnection, login: &str) -> Result<Option<users::Model>, DbErr> {
    if Users::find().count(db).await? > 0 {
        return Ok(None);
    }

    let role = match Roles::find().filter(roles::Column::IsAdmin.eq(true)).one(db).await? {
        Some(role) => role,
        None => {
            create_role(
                db,
                CreateRole {
                    name: "Администратор".to_string(),
                    is_admin: true,
                },
            )
            .await?
        }
    };

    let user = create(
        db,
        CreateUser {
            login: login.to_string(),
            full_name: login.to_string(),
            role_id: role.id,
        },
    )
    .await?;
    debug!("Bootstrapped admin user {}", user.login);
    Ok(Some(user))
}

/// Resolve what the user may see.
///
/// Unknown and inactive users get an empty scope; admin roles are
/// unrestricted.
pub async fn load_scope(db: &DatabaseConnection, user_id: i32) -> Result<AccessScope, DbErr> {
    let Some(user) = Users::find_by_id(user_id).one(db).await? else {
        debug!("User {user_id} not found, empty access scope");
        return Ok(AccessScope::none());
    };
    if !user.is_active {
        debug!("User {} is inactive, empty access scope", user.login);
        return Ok(AccessScope::none());
    }

    let is_admin = Roles::find_by_id(user.role_id)
        .one(db)
        .await?
        .is_some_and(|role| role.is_admin);
    if is_admin {
        return Ok(AccessScope::Unrestricted);
    }

    let grants = list_grants(db, user_id).await?;
    let departments: Vec<i32> = grants.iter().filter_map(|g| g.department_id).collect();
    let warehouse_ids: Vec<i32> = grants.iter().filter_map(|g| g.warehouse_id).collect();

    let warehouse_departments = if warehouse_ids.is_empty() {
        Vec::new()
    } else {
        Warehouses::find()
            .filter(warehouses::Column::Id.is_in(warehouse_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|w| (w.id, w.department_id))
            .collect()
    };

    Ok(AccessScope::restricted(departments, warehouse_departments))
}
