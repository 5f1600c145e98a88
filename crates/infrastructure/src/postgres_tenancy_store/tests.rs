use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tessera_application::{
    AnnouncementRepository, AuditEvent, AuditRepository, CompanyRepository, InviteCodeRepository,
    InviteRedemption, MemberRepository, SystemRoleRepository, TaskRepository,
};
use tessera_core::{AppError, CallerIdentity, CompanyId, NonEmptyString, Timestamp};
use tessera_domain::{
    Announcement, AnnouncementId, AuditAction, Capability, CapabilitySet, Company, CompanyRole,
    InviteCode, InviteCodeHash, InviteState, InviteStatus, Member, PersonnelId, SystemRole, Task,
    TaskDraft, TaskId, TaskStatus,
};
use uuid::Uuid;

use super::{MIGRATOR, PostgresTenancyStore};

async fn test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        return None;
    };

    let pool = match PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url.as_str())
        .await
    {
        Ok(pool) => pool,
        Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
    };

    if let Err(error) = MIGRATOR.run(&pool).await {
        panic!("failed to run migrations for postgres tenancy tests: {error}");
    }

    Some(pool)
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn identity(value: &str) -> CallerIdentity {
    CallerIdentity::new(value).unwrap_or_else(|_| unreachable!())
}

fn name(value: &str) -> NonEmptyString {
    NonEmptyString::new(value).unwrap_or_else(|_| unreachable!())
}

fn code_hash() -> InviteCodeHash {
    InviteCodeHash::new(format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    ))
    .unwrap_or_else(|_| unreachable!())
}

async fn seeded_company(store: &PostgresTenancyStore) -> (CompanyId, CallerIdentity) {
    let company_id = CompanyId::new(unique("co")).unwrap_or_else(|_| unreachable!());
    let owner = identity(&unique("owner"));
    let created = store
        .create_company(Company::new(
            company_id.clone(),
            name("Seeded Company"),
            owner.clone(),
            Timestamp::from_nanos(1),
        ))
        .await;
    assert!(created.is_ok());
    (company_id, owner)
}

async fn seeded_invite(
    store: &PostgresTenancyStore,
    company_id: &CompanyId,
    issued_by: &CallerIdentity,
    validity_nanos: i64,
) -> InviteCodeHash {
    let hash = code_hash();
    let invite = InviteCode::issue(
        hash.clone(),
        company_id.clone(),
        CompanyRole::Employee,
        issued_by.clone(),
        Timestamp::from_nanos(100),
        validity_nanos,
    )
    .unwrap_or_else(|_| unreachable!());
    assert!(store.create_invite(invite).await.is_ok());
    hash
}

fn redemption(hash: &InviteCodeHash, redeemer: &CallerIdentity, at: i64) -> InviteRedemption {
    InviteRedemption {
        code_hash: hash.clone(),
        identity: redeemer.clone(),
        display_name: name("Joiner"),
        personnel_id: PersonnelId::generate(),
        redeemed_at: Timestamp::from_nanos(at),
    }
}

#[tokio::test]
async fn companies_round_trip_and_reject_duplicates() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresTenancyStore::new(pool);
    let (company_id, owner) = seeded_company(&store).await;

    let found = store
        .find_company(&company_id)
        .await
        .unwrap_or_else(|error| panic!("find failed: {error}"))
        .unwrap_or_else(|| panic!("company missing"));
    assert!(found.was_registered_by(&owner));

    let by_registrant = store
        .find_company_registered_by(&owner)
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    assert_eq!(by_registrant.map(|company| company.company_id), Some(company_id.clone()));
    let unknown = store
        .find_company_registered_by(&identity(&unique("nobody")))
        .await
        .unwrap_or_else(|error| panic!("lookup failed: {error}"));
    assert!(unknown.is_none());

    let again = store
        .create_company(Company::new(
            company_id,
            name("Again"),
            owner,
            Timestamp::from_nanos(2),
        ))
        .await;
    assert!(matches!(again, Err(AppError::Duplicate(_))));
}

#[tokio::test]
async fn members_keep_permissions_and_unique_personnel_ids() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresTenancyStore::new(pool);
    let (company_id, owner) = seeded_company(&store).await;
    let personnel_id = PersonnelId::generate();

    let mut permissions = CapabilitySet::for_role(CompanyRole::Employee);
    permissions.set(Capability::ReportView, true);
    let member = Member::new(owner.clone(), company_id.clone(), name("Owner"), CompanyRole::Employee)
        .with_personnel_id(personnel_id.clone())
        .with_permissions(permissions);
    assert!(store.insert_member(member.clone()).await.is_ok());

    let by_personnel = store
        .find_member_by_personnel_id(&company_id, &personnel_id)
        .await;
    assert_eq!(by_personnel, Ok(Some(member.clone())));

    let clash = Member::new(
        identity(&unique("other")),
        company_id.clone(),
        name("Clash"),
        CompanyRole::Employee,
    )
    .with_personnel_id(personnel_id);
    let inserted = store.insert_member(clash).await;
    assert!(matches!(inserted, Err(AppError::Duplicate(_))));

    let (other_company, _) = seeded_company(&store).await;
    let moved = Member::restore(
        owner,
        other_company,
        None,
        name("Owner"),
        CompanyRole::Owner,
        CapabilitySet::all(),
        true,
    );
    let update = store.update_member(moved).await;
    assert!(matches!(update, Err(AppError::Validation(_))));

    let ghost = Member::new(
        identity(&unique("ghost")),
        company_id.clone(),
        name("Ghost"),
        CompanyRole::Employee,
    );
    let missing = store.update_member(ghost).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let listed = store.list_members(&company_id).await;
    assert_eq!(listed.map(|members| members.len()), Ok(1));
}

#[tokio::test]
async fn redeem_consumes_once_and_records_expiry() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresTenancyStore::new(pool);
    let (company_id, owner) = seeded_company(&store).await;

    let unknown = store
        .redeem_invite(redemption(&code_hash(), &identity(&unique("u")), 150))
        .await;
    assert_eq!(unknown, Err(AppError::InvalidCode));

    let hash = seeded_invite(&store, &company_id, &owner, 1_000).await;
    let redeemer = identity(&unique("bob"));
    let member = store
        .redeem_invite(redemption(&hash, &redeemer, 150))
        .await
        .unwrap_or_else(|error| panic!("redeem failed: {error}"));
    assert_eq!(member.role(), CompanyRole::Employee);
    assert_eq!(member.company_id(), &company_id);

    let second = store
        .redeem_invite(redemption(&hash, &identity(&unique("carol")), 160))
        .await;
    assert_eq!(second, Err(AppError::AlreadyUsed));

    let short = seeded_invite(&store, &company_id, &owner, 0).await;
    let expired = store
        .redeem_invite(redemption(&short, &identity(&unique("late")), 101))
        .await;
    assert_eq!(expired, Err(AppError::Expired));

    let invites = store
        .list_invites(&company_id)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    let stored_short = invites
        .iter()
        .find(|invite| invite.code_hash() == &short)
        .unwrap_or_else(|| panic!("short invite missing"));
    assert!(matches!(
        stored_short.state(),
        InviteState::Expired { observed_at } if observed_at.as_nanos() == 101
    ));
    let stored_used = invites
        .iter()
        .find(|invite| invite.code_hash() == &hash)
        .unwrap_or_else(|| panic!("used invite missing"));
    assert_eq!(
        stored_used.status_at(Timestamp::from_nanos(150)),
        InviteStatus::Consumed
    );
}

#[tokio::test]
async fn existing_member_cannot_burn_an_invite() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresTenancyStore::new(pool);
    let (company_id, owner) = seeded_company(&store).await;
    assert!(
        store
            .insert_member(Member::new(
                owner.clone(),
                company_id.clone(),
                name("Owner"),
                CompanyRole::Owner,
            ))
            .await
            .is_ok()
    );

    let hash = seeded_invite(&store, &company_id, &owner, 1_000).await;
    let duplicate = store.redeem_invite(redemption(&hash, &owner, 150)).await;
    assert!(matches!(duplicate, Err(AppError::Duplicate(_))));

    let newcomer = store
        .redeem_invite(redemption(&hash, &identity(&unique("new")), 150))
        .await;
    assert!(newcomer.is_ok());
}

#[tokio::test]
async fn concurrent_redemptions_commit_once() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = Arc::new(PostgresTenancyStore::new(pool));
    let (company_id, owner) = seeded_company(&store).await;
    let hash = seeded_invite(&store, &company_id, &owner, 1_000).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let request = redemption(&hash, &identity(&unique("racer")), 150);
        handles.push(tokio::spawn(async move { store.redeem_invite(request).await }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle
            .await
            .unwrap_or_else(|error| panic!("task panicked: {error}"))
        {
            Ok(_) => successes += 1,
            Err(AppError::AlreadyUsed) => {}
            Err(error) => panic!("unexpected redemption error: {error}"),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn tasks_and_announcements_stay_in_their_company() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresTenancyStore::new(pool);
    let (company_id, owner) = seeded_company(&store).await;
    let (other_company, _) = seeded_company(&store).await;

    let task_id = TaskId::new("t-1").unwrap_or_else(|_| unreachable!());
    let task = Task::new(TaskDraft {
        id: task_id.clone(),
        company_id: company_id.clone(),
        description: name("Inventory"),
        priority: 2,
        assignee: owner.clone(),
        created_by: owner.clone(),
        starts_at: Timestamp::from_nanos(5),
        ends_at: Timestamp::from_nanos(9),
        status: TaskStatus::InProgress,
    })
    .unwrap_or_else(|_| unreachable!());
    assert!(store.insert_task(task.clone()).await.is_ok());
    assert!(matches!(
        store.insert_task(task).await,
        Err(AppError::Duplicate(_))
    ));

    assert_eq!(store.find_task(&other_company, &task_id).await, Ok(None));
    let in_progress = store
        .list_tasks(&company_id, Some(TaskStatus::InProgress))
        .await;
    assert_eq!(in_progress.map(|tasks| tasks.len()), Ok(1));
    let completed = store
        .list_tasks(&company_id, Some(TaskStatus::Completed))
        .await;
    assert_eq!(completed.map(|tasks| tasks.len()), Ok(0));
    assert!(matches!(
        store.delete_task(&other_company, &task_id).await,
        Err(AppError::NotFound(_))
    ));

    for (id, created_at, target_role) in [
        ("a-old", 10, None),
        ("a-new", 20, Some(CompanyRole::Manager)),
    ] {
        let inserted = store
            .insert_announcement(Announcement {
                id: AnnouncementId::new(id).unwrap_or_else(|_| unreachable!()),
                company_id: company_id.clone(),
                content: name("Notice"),
                target_role,
                created_at: Timestamp::from_nanos(created_at),
                created_by: owner.clone(),
            })
            .await;
        assert!(inserted.is_ok());
    }

    let announcements = store
        .list_announcements(&company_id)
        .await
        .unwrap_or_else(|error| panic!("list failed: {error}"));
    let ids: Vec<&str> = announcements
        .iter()
        .map(|announcement| announcement.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a-new", "a-old"]);
    assert_eq!(announcements[0].target_role, Some(CompanyRole::Manager));
    assert_eq!(store.list_announcements(&other_company).await, Ok(Vec::new()));
}

#[tokio::test]
async fn system_roles_upsert_and_audit_appends() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let store = PostgresTenancyStore::new(pool);
    let subject = identity(&unique("admin"));

    assert_eq!(store.find_system_role(&subject).await, Ok(None));
    assert!(store.assign_system_role(&subject, SystemRole::Admin).await.is_ok());
    assert!(store.assign_system_role(&subject, SystemRole::Guest).await.is_ok());
    assert_eq!(
        store.find_system_role(&subject).await,
        Ok(Some(SystemRole::Guest))
    );

    let appended = store
        .append_event(AuditEvent {
            company_id: None,
            subject: subject.clone(),
            action: AuditAction::SystemRoleAssigned,
            resource_type: "system_role".to_owned(),
            resource_id: subject.as_str().to_owned(),
            detail: Some("role=guest".to_owned()),
        })
        .await;
    assert!(appended.is_ok());
}
