//! 인메모리 저장소
//!
//! `DATABASE_URL`이 없을 때의 개발용 백엔드이자 라우트 테스트용 구현.
//! 프로세스 재시작 시 데이터는 사라진다.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Document, ListFilter};
use super::repository::{DocumentRepository, Store};
use super::StoreError;
use crate::types::{ClientProfile, DmatAccount, PageRequest, Shareholder, Transfer};

/// 삽입 순서를 유지하는 문서 목록
pub struct MemoryCollection<T> {
    docs: RwLock<Vec<T>>,
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self { docs: RwLock::new(Vec::new()) }
    }
}

#[async_trait]
impl<T: Document> DocumentRepository<T> for MemoryCollection<T> {
    async fn list(&self, filter: &ListFilter, page: PageRequest) -> Result<(Vec<T>, u64), StoreError> {
        let docs = self.docs.read().await;

        // 최신 삽입이 앞에 오도록 역순으로 모은 뒤 안정 정렬
        let mut matched: Vec<&T> = docs.iter().rev().filter(|d| d.matches(filter)).collect();
        matched.sort_by(|a, b| b.created_at().cmp(&a.created_at()));

        let total = matched.len() as u64;
        let data = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.limit as usize)
            .cloned()
            .collect();
        Ok((data, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| d.id() == id).cloned())
    }

    async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<T>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.iter().filter(|d| ids.contains(&d.id())).cloned().collect())
    }

    async fn insert(&self, doc: &T) -> Result<(), StoreError> {
        self.docs.write().await.push(doc.clone());
        Ok(())
    }

    async fn replace(&self, doc: &T) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        match docs.iter_mut().find(|d| d.id() == doc.id()) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut docs = self.docs.write().await;
        let before = docs.len();
        docs.retain(|d| d.id() != id);
        Ok(docs.len() < before)
    }
}

/// 인메모리 저장소
pub struct MemoryStore {
    client_profiles: MemoryCollection<ClientProfile>,
    shareholders: MemoryCollection<Shareholder>,
    dmat_accounts: MemoryCollection<DmatAccount>,
    transfers: MemoryCollection<Transfer>,
    ready: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            client_profiles: MemoryCollection::default(),
            shareholders: MemoryCollection::default(),
            dmat_accounts: MemoryCollection::default(),
            transfers: MemoryCollection::default(),
            ready: AtomicBool::new(true),
        }
    }

    /// 연결 끊김 상황 재현용
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn client_profiles(&self) -> &dyn DocumentRepository<ClientProfile> {
        &self.client_profiles
    }

    fn shareholders(&self) -> &dyn DocumentRepository<Shareholder> {
        &self.shareholders
    }

    fn dmat_accounts(&self) -> &dyn DocumentRepository<DmatAccount> {
        &self.dmat_accounts
    }

    fn transfers(&self) -> &dyn DocumentRepository<Transfer> {
        &self.transfers
    }

    async fn ensure_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn health_check(&self) -> anyhow::Result<()> {
        if self.ready.load(Ordering::Acquire) {
            Ok(())
        } else {
            anyhow::bail!("memory store marked unavailable")
        }
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use crate::types::{DmatAccount, RenewalStatus};

    fn account(n: u32, minutes_ago: i64) -> DmatAccount {
        let ts = Utc::now() - Duration::minutes(minutes_ago);
        DmatAccount {
            id: Uuid::new_v4(),
            account_number: format!("DMAT-{:03}", n),
            holder_name: "Holder".into(),
            expiry_date: ts,
            renewal_status: RenewalStatus::Active,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_list_newest_first_with_offset() {
        let coll = MemoryCollection::<DmatAccount>::default();
        for n in 0..5 {
            coll.insert(&account(n, 10 - i64::from(n))).await.unwrap();
        }

        let (page, total) = coll.list(&ListFilter::All, PageRequest::new(2, 2)).await.unwrap();
        assert_eq!(total, 5);
        let numbers: Vec<_> = page.iter().map(|a| a.account_number.as_str()).collect();
        assert_eq!(numbers, vec!["DMAT-002", "DMAT-001"]);
    }

    #[tokio::test]
    async fn test_replace_and_delete_missing() {
        let coll = MemoryCollection::<DmatAccount>::default();
        let missing = account(1, 0);
        assert!(!coll.replace(&missing).await.unwrap());
        assert!(!coll.delete(missing.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_store_readiness_toggle() {
        let store = MemoryStore::new();
        assert!(store.ensure_ready().await);
        store.set_ready(false);
        assert!(!store.ensure_ready().await);
        assert!(store.health_check().await.is_err());
    }
}
