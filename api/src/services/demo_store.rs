//! Demo State Store
//!
//! # Overview
//!
//! DB 없이 대시보드/리포트 화면을 동작시키기 위한 로컬 상태 저장소.
//! DB 기반 리소스(client profiles 등)와는 완전히 분리되어 있다.
//!
//! ```text
//!  DemoAction ──▶ reduce(state, action) ──▶ new DemoState ──▶ persist (JSON blob)
//!                                                 ▲
//!  open(): persisted blob ─ rehydrate ────────────┘
//!  seed_if_empty(): people+dmat+transfers 가 모두 비어 있을 때만 1회
//! ```
//!
//! 상태는 전역 싱글턴이 아니라 `DemoStore` 값으로 주입된다.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::types::{date, PersonType, RenewalStatus, TransferStatus};

/// 로컬 저장 키 (파일 이름 기본값과 동일)
pub const STATE_KEY: &str = "smmpro-state";

/// 시드 데이터 id 생성용 고정 seed
pub const SEED_RNG_SEED: u64 = 0x5EED_5A11;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `prefix_xxxxxxx` 형태 id (base36 7자)
pub fn create_id(prefix: &str, rng: &mut impl Rng) -> String {
    let suffix: String = (0..7)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("{}_{}", prefix, suffix)
}

// ============ State Types ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Shareholder,
    Stockholder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PersonType,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub pan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmat_account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoDmatAccount {
    pub id: String,
    pub account_number: String,
    pub holder_name: String,
    pub expiry_date: DateTime<Utc>,
    pub renewal_status: RenewalStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoTransfer {
    pub id: String,
    pub person_id: String,
    pub person_type: PersonType,
    pub person_name: String,
    pub company: String,
    pub transfer_date: DateTime<Utc>,
    pub status: TransferStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_credit_date: Option<DateTime<Utc>>,
    #[serde(rename = "movedToIPF", default, skip_serializing_if = "Option::is_none")]
    pub moved_to_ipf: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dividends_received: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_dividends: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bonus_shares: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogEntry {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body_preview: String,
    pub created_at: DateTime<Utc>,
}

/// 전체 데모 상태 (저장/복원 단위)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoState {
    pub current_user: Option<User>,
    pub people: Vec<Person>,
    pub dmat_accounts: Vec<DemoDmatAccount>,
    pub transfers: Vec<DemoTransfer>,
    pub email_log: Vec<EmailLogEntry>,
}

impl DemoState {
    /// 시드가 이미 들어갔는지 (이메일 로그는 판단에서 제외)
    pub fn is_seeded(&self) -> bool {
        self.people.len() + self.dmat_accounts.len() + self.transfers.len() > 0
    }

    pub fn is_admin(&self) -> bool {
        self.current_user.as_ref().is_some_and(|u| u.role == Role::Admin)
    }
}

/// 부분 병합용 시드 (없는 컬렉션은 유지)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSeed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people: Option<Vec<Person>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmat_accounts: Option<Vec<DemoDmatAccount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfers: Option<Vec<DemoTransfer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_log: Option<Vec<EmailLogEntry>>,
}

/// 상태 전이 액션
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemoAction {
    SignIn(User),
    SignOut,
    UpsertPerson(Person),
    DeletePerson(String),
    UpsertDmat(DemoDmatAccount),
    DeleteDmat(String),
    UpsertTransfer(DemoTransfer),
    UpsertEmailLog(Vec<EmailLogEntry>),
    Seed(DemoSeed),
}

// ============ Reducer ============

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Person {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for DemoDmatAccount {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for DemoTransfer {
    fn key(&self) -> &str {
        &self.id
    }
}

/// 같은 id가 있으면 제자리 교체, 없으면 뒤에 추가
fn upsert<T: Keyed>(items: &mut Vec<T>, item: T) {
    match items.iter().position(|i| i.key() == item.key()) {
        Some(idx) => items[idx] = item,
        None => items.push(item),
    }
}

/// 순수 상태 전이
pub fn reduce(mut state: DemoState, action: DemoAction) -> DemoState {
    match action {
        DemoAction::SignIn(user) => state.current_user = Some(user),
        DemoAction::SignOut => state.current_user = None,
        DemoAction::UpsertPerson(person) => upsert(&mut state.people, person),
        DemoAction::DeletePerson(id) => state.people.retain(|p| p.id != id),
        DemoAction::UpsertDmat(account) => upsert(&mut state.dmat_accounts, account),
        DemoAction::DeleteDmat(id) => state.dmat_accounts.retain(|d| d.id != id),
        DemoAction::UpsertTransfer(transfer) => upsert(&mut state.transfers, transfer),
        DemoAction::UpsertEmailLog(log) => state.email_log = log,
        DemoAction::Seed(seed) => {
            if let Some(people) = seed.people {
                state.people = people;
            }
            if let Some(accounts) = seed.dmat_accounts {
                state.dmat_accounts = accounts;
            }
            if let Some(transfers) = seed.transfers {
                state.transfers = transfers;
            }
            if let Some(log) = seed.email_log {
                state.email_log = log;
            }
        }
    }
    state
}

// ============ Seed Data ============

const SEED_PEOPLE: [(&str, &str, PersonType); 12] = [
    ("Akanksha D.", "shareholder@smmpro.app", PersonType::Shareholder),
    ("Rahul K.", "rahul@example.com", PersonType::Stockholder),
    ("Meera S.", "meera@example.com", PersonType::Shareholder),
    ("Arjun P.", "arjun@example.com", PersonType::Stockholder),
    ("Priya N.", "priya@example.com", PersonType::Shareholder),
    ("Vikram R.", "vikram@example.com", PersonType::Stockholder),
    ("Sneha T.", "sneha@example.com", PersonType::Shareholder),
    ("Rohit M.", "rohit@example.com", PersonType::Stockholder),
    ("Isha K.", "isha@example.com", PersonType::Shareholder),
    ("Karan L.", "karan@example.com", PersonType::Stockholder),
    ("Devika B.", "devika@example.com", PersonType::Shareholder),
    ("Nitin H.", "stockholder@smmpro.app", PersonType::Stockholder),
];

/// DMAT 만기 오프셋 (일)
const SEED_EXPIRY_OFFSETS: [i64; 10] = [-20, -5, 3, 7, 12, 25, 40, 60, 1, 9];

fn seed_letter(n: usize) -> char {
    char::from(b'A' + (n % 26) as u8)
}

fn seed_pan(i: usize) -> String {
    format!(
        "{}{}{}{}{}{:03}{}",
        seed_letter(i),
        seed_letter(i + 3),
        seed_letter(i + 7),
        seed_letter(i + 11),
        seed_letter(i + 15),
        i % 1000,
        seed_letter(i + 19),
    )
}

fn seed_phone(i: usize) -> String {
    let digits = (700_000_000 + i * 12_345).to_string();
    format!("98{}", &digits[..8])
}

/// 고정 샘플 데이터 생성 (같은 `now`와 rng seed면 항상 같은 결과)
pub fn seed_data(now: DateTime<Utc>, rng: &mut impl Rng) -> DemoSeed {
    let mut people: Vec<Person> = SEED_PEOPLE
        .iter()
        .enumerate()
        .map(|(i, (name, email, kind))| Person {
            id: create_id("p", rng),
            kind: *kind,
            name: name.to_string(),
            email: email.to_string(),
            phone: seed_phone(i),
            pan: seed_pan(i),
            dmat_account_id: None,
        })
        .collect();

    let dmat_accounts: Vec<DemoDmatAccount> = SEED_EXPIRY_OFFSETS
        .iter()
        .zip(people.iter())
        .enumerate()
        .map(|(i, (days, person))| DemoDmatAccount {
            id: create_id("d", rng),
            account_number: format!("DMAT-{:03}", i + 1),
            holder_name: person.name.clone(),
            expiry_date: now + Duration::days(*days),
            renewal_status: RenewalStatus::from_days_until_expiry(*days),
        })
        .collect();

    // 앞의 10명을 DMAT 계좌에 연결
    for (person, account) in people.iter_mut().zip(dmat_accounts.iter()) {
        person.dmat_account_id = Some(account.id.clone());
    }

    let transfers = vec![
        DemoTransfer {
            id: create_id("tr", rng),
            person_id: people[0].id.clone(),
            person_type: people[0].kind,
            person_name: people[0].name.clone(),
            company: "INFY".to_string(),
            transfer_date: now,
            status: TransferStatus::InProcess,
            expected_credit_date: Some(now + Duration::days(3)),
            moved_to_ipf: Some(false),
            dividends_received: None,
            pending_dividends: None,
            bonus_shares: None,
        },
        DemoTransfer {
            id: create_id("tr", rng),
            person_id: people[1].id.clone(),
            person_type: people[1].kind,
            person_name: people[1].name.clone(),
            company: "TCS".to_string(),
            transfer_date: now,
            status: TransferStatus::Completed,
            expected_credit_date: None,
            moved_to_ipf: Some(true),
            dividends_received: Some(320.5),
            pending_dividends: Some(120.0),
            bonus_shares: Some(1),
        },
    ];

    DemoSeed {
        people: Some(people),
        dmat_accounts: Some(dmat_accounts),
        transfers: Some(transfers),
        email_log: None,
    }
}

// ============ Persistence ============

/// 상태 blob 저장 백엔드 (브라우저 로컬 스토리지 대응)
pub trait StatePersistence: Send + Sync {
    fn load(&self) -> Result<Option<String>>;
    fn save(&self, raw: &str) -> Result<()>;
}

/// JSON 파일 저장
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StatePersistence for FilePersistence {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn save(&self, raw: &str) -> Result<()> {
        std::fs::write(&self.path, raw).with_context(|| format!("writing {}", self.path.display()))
    }
}

// ============ Store ============

/// 신규 이전 기록 입력 (데모 화면 폼)
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferDraft {
    pub person_id: String,
    pub company: String,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub transfer_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: TransferStatus,
    #[serde(default, deserialize_with = "date::deserialize_optional")]
    pub expected_credit_date: Option<DateTime<Utc>>,
    #[serde(rename = "movedToIPF", default)]
    pub moved_to_ipf: bool,
}

/// 대시보드 요약
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub transfers: usize,
    /// 향후 10일 내 만기
    pub upcoming_expiries: usize,
    pub dividends_due: f64,
    pub dmat_accounts: usize,
    /// 최근 5건 (최신순)
    pub recent_transfers: Vec<DemoTransfer>,
}

/// 주입형 데모 상태 컨테이너
pub struct DemoStore {
    state: DemoState,
    persistence: Box<dyn StatePersistence>,
}

impl DemoStore {
    /// 저장된 상태 복원. 없거나 손상되었으면 빈 상태로 시작.
    pub fn open(persistence: Box<dyn StatePersistence>) -> Self {
        let state = match persistence.load() {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable demo state: {}", e);
                DemoState::default()
            }),
            Ok(None) => DemoState::default(),
            Err(e) => {
                tracing::warn!("Demo state not loaded: {:#}", e);
                DemoState::default()
            }
        };
        Self { state, persistence }
    }

    pub fn state(&self) -> &DemoState {
        &self.state
    }

    /// 액션 적용 후 전체 상태 저장
    ///
    /// 저장에 실패하면 메모리 상태도 이전 그대로 남는다.
    pub fn dispatch(&mut self, action: DemoAction) -> Result<&DemoState> {
        let next = reduce(self.state.clone(), action);
        let raw = serde_json::to_string(&next)?;
        self.persistence.save(&raw)?;
        self.state = next;
        Ok(&self.state)
    }

    /// 비어 있을 때만 고정 시드 적용. 적용했으면 `true`.
    pub fn seed_if_empty(&mut self, now: DateTime<Utc>) -> Result<bool> {
        if self.state.is_seeded() {
            return Ok(false);
        }
        let mut rng = StdRng::seed_from_u64(SEED_RNG_SEED);
        self.dispatch(DemoAction::Seed(seed_data(now, &mut rng)))?;
        tracing::info!(people = self.state.people.len(), "Demo state seeded");
        Ok(true)
    }

    /// 이전 기록 추가. 대상 사람이 없으면 `None` (상태 변경 없음).
    ///
    /// IPF 이동 건의 배당/보너스 수치는 무작위 자리표시 값이다.
    pub fn log_transfer(
        &mut self,
        draft: TransferDraft,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
    ) -> Result<Option<DemoTransfer>> {
        let Some(person) = self.state.people.iter().find(|p| p.id == draft.person_id) else {
            return Ok(None);
        };

        let ipf = draft.moved_to_ipf;
        let transfer = DemoTransfer {
            id: create_id("tr", rng),
            person_id: person.id.clone(),
            person_type: person.kind,
            person_name: person.name.clone(),
            company: draft.company,
            transfer_date: draft.transfer_date.unwrap_or(now),
            status: draft.status,
            expected_credit_date: draft.expected_credit_date,
            moved_to_ipf: Some(ipf),
            dividends_received: ipf.then(|| (rng.gen::<f64>() * 1000.0).round() / 100.0),
            pending_dividends: ipf.then(|| (rng.gen::<f64>() * 500.0).round() / 100.0),
            bonus_shares: ipf.then(|| rng.gen_range(0..5)),
        };

        self.dispatch(DemoAction::UpsertTransfer(transfer.clone()))?;
        Ok(Some(transfer))
    }

    pub fn dashboard(&self, now: DateTime<Utc>) -> DashboardSummary {
        let horizon = now + Duration::days(10);
        let state = &self.state;
        DashboardSummary {
            transfers: state.transfers.len(),
            upcoming_expiries: state
                .dmat_accounts
                .iter()
                .filter(|a| a.expiry_date >= now && a.expiry_date <= horizon)
                .count(),
            dividends_due: state.transfers.iter().filter_map(|t| t.pending_dividends).sum(),
            dmat_accounts: state.dmat_accounts.len(),
            recent_transfers: state.transfers.iter().rev().take(5).cloned().collect(),
        }
    }
}
