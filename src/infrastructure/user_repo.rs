use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::UserStore;
use crate::domain::user::{User, UserProfile};
use crate::schema::users;

use super::models::{NewUserRow, UserChangeset, UserRow};

impl UserStore for PgConnection {
    fn find_user(&mut self, id: Uuid) -> Result<Option<User>, DomainError> {
        let row = users::table
            .filter(users::id.eq(id))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(self)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn find_user_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let row = users::table
            .filter(users::external_id.eq(external_id))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .first(self)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn find_user_by_display_name(
        &mut self,
        display_name: &str,
    ) -> Result<Option<User>, DomainError> {
        let row = users::table
            .filter(users::display_name.eq(display_name))
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .order(users::created_at.asc())
            .first(self)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn insert_user(&mut self, profile: UserProfile) -> Result<User, DomainError> {
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                external_id: profile.external_id,
                display_name: profile.display_name,
                email: profile.email,
                access_token: profile.access_token,
                phone: profile.phone,
                is_member: profile.is_member,
            })
            .returning(UserRow::as_returning())
            .get_result(self)?;
        Ok(row.into())
    }

    fn update_user(&mut self, user: &User) -> Result<(), DomainError> {
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(user.id))
                .filter(users::is_deleted.eq(false)),
        )
        .set(&UserChangeset {
            display_name: &user.display_name,
            email: &user.email,
            access_token: &user.access_token,
            phone: &user.phone,
            is_member: user.is_member,
            updated_at: Utc::now(),
        })
        .execute(self)?;

        if updated == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }

    fn list_users(&mut self) -> Result<Vec<User>, DomainError> {
        let rows = users::table
            .filter(users::is_deleted.eq(false))
            .select(UserRow::as_select())
            .order(users::created_at.asc())
            .load(self)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    fn soft_delete_user(&mut self, id: Uuid) -> Result<(), DomainError> {
        let now = Utc::now();
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(id))
                .filter(users::is_deleted.eq(false)),
        )
        .set((
            users::is_deleted.eq(true),
            users::deleted_at.eq(Some(now)),
            users::updated_at.eq(now),
        ))
        .execute(self)?;

        if updated == 0 {
            return Err(DomainError::UserNotFound);
        }
        Ok(())
    }
}
