//! User repository (内存存储)
//! 仅用于本地认证模式，进程重启后数据丢失

use crate::{error::AppError, models::user::User};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct UserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据用户名或邮箱查找用户（不区分大小写）
    /// 用户名匹配优先于邮箱匹配
    pub async fn find_by_login(&self, login: &str) -> Option<User> {
        let login = login.trim().to_lowercase();
        let users = self.users.read().await;

        users
            .values()
            .find(|u| u.username.to_lowercase() == login)
            .or_else(|| users.values().find(|u| u.email.to_lowercase() == login))
            .cloned()
    }

    /// 创建用户
    /// 用户名与邮箱共用一个登录名空间：任一字段与已有用户的用户名或邮箱相同都返回 Conflict。
    /// 检查与写入在同一把写锁内完成
    pub async fn create(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        let username = user.username.to_lowercase();
        let email = user.email.to_lowercase();

        for existing in users.values() {
            let taken_username = existing.username.to_lowercase();
            let taken_email = existing.email.to_lowercase();

            if taken_username == username || taken_email == username {
                return Err(AppError::Conflict("用户名已被占用".to_string()));
            }
            if taken_email == email || taken_username == email {
                return Err(AppError::Conflict("邮箱已被注册".to_string()));
            }
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    /// 用户总数
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}
