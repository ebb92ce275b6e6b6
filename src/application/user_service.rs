use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{Storage, UserStore};
use crate::domain::user::{User, UserProfile};

pub struct UserService<S> {
    storage: S,
}

impl<S: Storage> UserService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Stores the profile under the user already linked to its external id,
    /// or creates a new user when there is none.
    pub fn save_or_update(&self, profile: UserProfile) -> Result<User, DomainError> {
        self.storage.transaction(|tx| {
            match tx.find_user_by_external_id(&profile.external_id)? {
                Some(existing) => {
                    let user = User {
                        display_name: profile.display_name,
                        email: profile.email,
                        access_token: profile.access_token,
                        phone: profile.phone,
                        is_member: profile.is_member,
                        ..existing
                    };
                    tx.update_user(&user)?;
                    Ok(user)
                }
                None => {
                    let user = tx.insert_user(profile)?;
                    log::info!("Registered user {} ({})", user.id, user.display_name);
                    Ok(user)
                }
            }
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.storage
            .read(|conn| conn.find_user(id))?
            .ok_or(DomainError::UserNotFound)
    }

    pub fn find_by_external_id(&self, external_id: &str) -> Result<User, DomainError> {
        self.storage
            .read(|conn| conn.find_user_by_external_id(external_id))?
            .ok_or(DomainError::UserNotFound)
    }

    pub fn list_users(&self) -> Result<Vec<User>, DomainError> {
        self.storage.read(|conn| conn.list_users())
    }

    pub fn delete_user(&self, id: Uuid) -> Result<(), DomainError> {
        self.storage.transaction(|tx| tx.soft_delete_user(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryStorage;

    fn profile(external_id: &str, display_name: &str) -> UserProfile {
        UserProfile {
            external_id: external_id.to_string(),
            display_name: display_name.to_string(),
            email: format!("{display_name}@example.com"),
            access_token: "token-1".to_string(),
            phone: String::new(),
            is_member: false,
        }
    }

    #[test]
    fn upsert_keeps_id_for_known_external_id() {
        let service = UserService::new(InMemoryStorage::new());
        let first = service.save_or_update(profile("U1", "aki")).unwrap();

        let mut changed = profile("U1", "aki-san");
        changed.access_token = "token-2".to_string();
        let second = service.save_or_update(changed).unwrap();

        assert_eq!(first.id, second.id);
        let stored = service.find_by_external_id("U1").unwrap();
        assert_eq!(stored.display_name, "aki-san");
        assert_eq!(stored.access_token, "token-2");
        assert_eq!(service.list_users().unwrap().len(), 1);
    }

    #[test]
    fn upsert_creates_new_user_for_unknown_external_id() {
        let service = UserService::new(InMemoryStorage::new());
        let a = service.save_or_update(profile("U1", "aki")).unwrap();
        let b = service.save_or_update(profile("U2", "ren")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(service.list_users().unwrap().len(), 2);
    }

    #[test]
    fn deleted_user_is_hidden() {
        let service = UserService::new(InMemoryStorage::new());
        let user = service.save_or_update(profile("U1", "aki")).unwrap();

        service.delete_user(user.id).unwrap();

        assert!(matches!(service.get_user(user.id), Err(DomainError::UserNotFound)));
        assert!(matches!(service.delete_user(user.id), Err(DomainError::UserNotFound)));
        assert!(service.list_users().unwrap().is_empty());
    }
}
