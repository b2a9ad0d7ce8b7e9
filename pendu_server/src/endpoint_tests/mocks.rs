use chrono::Utc;
use mockall::mock;
use pendu_engine::{
    db_types::{AccountStatus, NewUserAccount, Role, StoredPassword, UserAccount},
    helpers::{hash_password, HashParams},
    traits::{UserManagement, UserStoreError},
};

mock! {
    pub UserStore {}
    impl UserManagement for UserStore {
        async fn fetch_user_by_email(&self, email: &str) -> Result<Option<UserAccount>, UserStoreError>;
        async fn fetch_user_by_id(&self, id: i64, status: Option<AccountStatus>) -> Result<Option<UserAccount>, UserStoreError>;
        async fn fetch_users(&self) -> Result<Vec<UserAccount>, UserStoreError>;
        async fn fetch_users_by_status(&self, status: AccountStatus) -> Result<Vec<UserAccount>, UserStoreError>;
        async fn insert_user(&self, user: NewUserAccount) -> Result<UserAccount, UserStoreError>;
        async fn update_password(&self, email: &str, password: StoredPassword) -> Result<(), UserStoreError>;
        async fn update_status(&self, id: i64, from: AccountStatus, to: AccountStatus) -> Result<u64, UserStoreError>;
        async fn soft_delete_user(&self, id: i64, only_pending: bool) -> Result<u64, UserStoreError>;
        async fn touch_last_login(&self, email: &str) -> Result<(), UserStoreError>;
        async fn clear_push_token(&self, token: &str) -> Result<u64, UserStoreError>;
        async fn set_push_token(&self, email: &str, token: &str) -> Result<(), UserStoreError>;
    }
}

pub fn user_with_password(email: &str, password: &str, role: Role, status: AccountStatus) -> UserAccount {
    let password = hash_password(password, HashParams::default()).unwrap();
    UserAccount {
        id: 1,
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email_address: email.to_string(),
        role,
        status,
        password,
        push_token: None,
        last_login: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
