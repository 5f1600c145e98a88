use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use tessera_core::{
    AppError, AppResult, CallerIdentity, CompanyId, NonEmptyString, Timestamp,
    time::NANOS_PER_SECOND,
};
use tessera_domain::{
    AuditAction, CapabilitySet, CompanyRole, InviteCode, InviteStatus, Member, PersonnelId,
};
use tokio::sync::Mutex;

use super::{InviteCodeService, InviteSettings};
use crate::{
    AuditEvent, AuditRepository, AuthorizationGate, Clock, InviteCodeRepository,
    InviteRedemption, MemberRepository, WriteSerializer,
};

#[derive(Default)]
struct FakeStore {
    members: Mutex<HashMap<CallerIdentity, Member>>,
    invites: Mutex<Vec<InviteCode>>,
    events: Mutex<Vec<AuditEvent>>,
    skip_personnel: AtomicBool,
}

#[async_trait]
impl MemberRepository for FakeStore {
    async fn find_member(&self, identity: &CallerIdentity) -> AppResult<Option<Member>> {
        Ok(self.members.lock().await.get(identity).cloned())
    }

    async fn find_member_by_personnel_id(
        &self,
        _company_id: &CompanyId,
        _personnel_id: &PersonnelId,
    ) -> AppResult<Option<Member>> {
        Ok(None)
    }

    async fn insert_member(&self, member: Member) -> AppResult<()> {
        self.members
            .lock()
            .await
            .insert(member.identity().clone(), member);
        Ok(())
    }

    async fn update_member(&self, member: Member) -> AppResult<()> {
        self.insert_member(member).await
    }

    async fn list_members(&self, _company_id: &CompanyId) -> AppResult<Vec<Member>> {
        Ok(self.members.lock().await.values().cloned().collect())
    }
}

#[async_trait]
impl InviteCodeRepository for FakeStore {
    async fn create_invite(&self, invite: InviteCode) -> AppResult<()> {
        self.invites.lock().await.push(invite);
        Ok(())
    }

    async fn redeem_invite(&self, redemption: InviteRedemption) -> AppResult<Member> {
        let mut invites = self.invites.lock().await;
        let invite = invites
            .iter_mut()
            .find(|invite| invite.code_hash() == &redemption.code_hash)
            .ok_or(AppError::InvalidCode)?;
        invite.check_redeemable(redemption.redeemed_at)?;
        if self.find_member(&redemption.identity).await?.is_some() {
            return Err(AppError::Duplicate("identity already has a profile".to_owned()));
        }

        let grant = invite.consume(redemption.identity.clone(), redemption.redeemed_at)?;
        let mut member = Member::new(
            redemption.identity,
            grant.company_id,
            redemption.display_name,
            grant.role,
        );
        if !self.skip_personnel.load(Ordering::SeqCst) {
            member = member.with_personnel_id(redemption.personnel_id);
        }
        self.insert_member(member.clone()).await?;
        Ok(member)
    }

    async fn list_invites(&self, company_id: &CompanyId) -> AppResult<Vec<InviteCode>> {
        Ok(self
            .invites
            .lock()
            .await
            .iter()
            .filter(|invite| invite.company_id() == company_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
struct ManualClock {
    nanos: AtomicI64,
}

impl ManualClock {
    fn advance(&self, nanos: i64) {
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

fn identity(value: &str) -> CallerIdentity {
    CallerIdentity::new(value).unwrap_or_else(|_| unreachable!())
}

async fn service_with(
    members: Vec<Member>,
) -> (InviteCodeService, Arc<FakeStore>, Arc<ManualClock>) {
    let store = Arc::new(FakeStore::default());
    for member in members {
        store
            .insert_member(member)
            .await
            .unwrap_or_else(|_| unreachable!());
    }
    let clock = Arc::new(ManualClock::default());
    let service = InviteCodeService::new(
        store.clone(),
        store.clone(),
        AuthorizationGate::new(store.clone()),
        clock.clone(),
        WriteSerializer::new(),
        InviteSettings::default(),
    );
    (service, store, clock)
}

fn member(name: &str, role: CompanyRole) -> Member {
    Member::new(
        identity(name),
        CompanyId::new("acme").unwrap_or_else(|_| unreachable!()),
        NonEmptyString::new(name).unwrap_or_else(|_| unreachable!()),
        role,
    )
}

#[tokio::test]
async fn issuing_follows_the_role_hierarchy() {
    let (service, _, _) = service_with(vec![
        member("owner", CompanyRole::Owner),
        member("manager", CompanyRole::Manager),
        member("employee", CompanyRole::Employee),
    ])
    .await;

    assert!(
        service
            .generate_code(&identity("owner"), CompanyRole::Manager, 10)
            .await
            .is_ok()
    );
    assert!(
        service
            .generate_code(&identity("manager"), CompanyRole::Employee, 10)
            .await
            .is_ok()
    );

    let manager_for_manager = service
        .generate_code(&identity("manager"), CompanyRole::Manager, 10)
        .await;
    assert!(matches!(manager_for_manager, Err(AppError::Unauthorized(_))));

    let employee_for_employee = service
        .generate_code(&identity("employee"), CompanyRole::Employee, 10)
        .await;
    assert!(matches!(employee_for_employee, Err(AppError::Unauthorized(_))));

    let owner_for_owner = service
        .generate_code(&identity("owner"), CompanyRole::Owner, 10)
        .await;
    assert!(matches!(owner_for_owner, Err(AppError::Unauthorized(_))));
}

#[tokio::test]
async fn validity_is_bounded() {
    let (service, _, _) = service_with(vec![member("owner", CompanyRole::Owner)]).await;

    let negative = service
        .generate_code(&identity("owner"), CompanyRole::Employee, -1)
        .await;
    assert!(matches!(negative, Err(AppError::Validation(_))));

    let too_long = service
        .generate_code(
            &identity("owner"),
            CompanyRole::Employee,
            31 * 24 * 60 * 60 * NANOS_PER_SECOND,
        )
        .await;
    assert!(matches!(too_long, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn redeemed_member_gets_role_defaults_not_owner_flags() {
    let (service, store, _) = service_with(vec![member("owner", CompanyRole::Owner)]).await;
    let issued = service
        .generate_code(&identity("owner"), CompanyRole::Employee, NANOS_PER_SECOND)
        .await
        .unwrap_or_else(|error| panic!("issue failed: {error}"));

    let profile = service
        .redeem_code(&identity("bob"), &issued.code, "Bob")
        .await
        .unwrap_or_else(|error| panic!("redeem failed: {error}"));

    assert_eq!(profile.role, CompanyRole::Employee);
    assert_eq!(profile.permissions, CapabilitySet::for_role(CompanyRole::Employee));
    assert_ne!(profile.permissions, CapabilitySet::all());
    assert_eq!(store.events.lock().await.len(), 2);
}

#[tokio::test]
async fn redemption_audit_names_the_new_personnel_record() {
    let (service, store, _) = service_with(vec![member("owner", CompanyRole::Owner)]).await;
    let issued = service
        .generate_code(&identity("owner"), CompanyRole::Employee, NANOS_PER_SECOND)
        .await
        .unwrap_or_else(|error| panic!("issue failed: {error}"));

    service
        .redeem_code(&identity("bob"), &issued.code, "Bob")
        .await
        .unwrap_or_else(|error| panic!("redeem failed: {error}"));

    let bob = store
        .find_member(&identity("bob"))
        .await
        .unwrap_or_else(|_| unreachable!())
        .unwrap_or_else(|| panic!("bob missing"));
    let events = store.events.lock().await;
    let redeemed = events
        .iter()
        .find(|event| event.action == AuditAction::InviteRedeemed)
        .unwrap_or_else(|| panic!("redeem event missing"));
    assert_eq!(
        Some(redeemed.resource_id.as_str()),
        bob.personnel_id().map(PersonnelId::as_str)
    );
}

#[tokio::test]
async fn redemption_without_personnel_record_is_internal() {
    let (service, store, _) = service_with(vec![member("owner", CompanyRole::Owner)]).await;
    let issued = service
        .generate_code(&identity("owner"), CompanyRole::Employee, NANOS_PER_SECOND)
        .await
        .unwrap_or_else(|error| panic!("issue failed: {error}"));
    store.skip_personnel.store(true, Ordering::SeqCst);

    let result = service.redeem_code(&identity("bob"), &issued.code, "Bob").await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    let events = store.events.lock().await;
    assert!(events.iter().all(|event| event.action != AuditAction::InviteRedeemed));
    assert!(events.iter().all(|event| !event.resource_id.is_empty()));
}

#[tokio::test]
async fn unknown_blank_and_reused_codes_fail_distinctly() {
    let (service, _, _) = service_with(vec![member("owner", CompanyRole::Owner)]).await;
    let issued = service
        .generate_code(&identity("owner"), CompanyRole::Employee, NANOS_PER_SECOND)
        .await
        .unwrap_or_else(|error| panic!("issue failed: {error}"));

    assert_eq!(
        service.redeem_code(&identity("bob"), "deadbeef", "Bob").await,
        Err(AppError::InvalidCode)
    );
    assert_eq!(
        service.redeem_code(&identity("bob"), "  ", "Bob").await,
        Err(AppError::InvalidCode)
    );
    assert!(
        service
            .redeem_code(&identity("bob"), &issued.code, "Bob")
            .await
            .is_ok()
    );
    assert_eq!(
        service.redeem_code(&identity("carol"), &issued.code, "Carol").await,
        Err(AppError::AlreadyUsed)
    );
}

#[tokio::test]
async fn zero_validity_expires_one_nanosecond_later() {
    let (service, _, clock) = service_with(vec![member("owner", CompanyRole::Owner)]).await;
    let issued = service
        .generate_code(&identity("owner"), CompanyRole::Employee, 0)
        .await
        .unwrap_or_else(|error| panic!("issue failed: {error}"));

    clock.advance(1);
    assert_eq!(
        service.redeem_code(&identity("bob"), &issued.code, "Bob").await,
        Err(AppError::Expired)
    );

    let listed = service
        .list_invites(&identity("owner"))
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].status, InviteStatus::Expired);
    assert!(!listed[0].reference.is_empty());
}

#[tokio::test]
async fn existing_member_cannot_redeem_and_code_survives() {
    let (service, _, _) = service_with(vec![
        member("owner", CompanyRole::Owner),
        member("mia", CompanyRole::Manager),
    ])
    .await;
    let issued = service
        .generate_code(&identity("owner"), CompanyRole::Employee, NANOS_PER_SECOND)
        .await
        .unwrap_or_else(|error| panic!("issue failed: {error}"));

    let result = service.redeem_code(&identity("mia"), &issued.code, "Mia").await;
    assert!(matches!(result, Err(AppError::Duplicate(_))));
    assert!(
        service
            .redeem_code(&identity("bob"), &issued.code, "Bob")
            .await
            .is_ok()
    );
}
