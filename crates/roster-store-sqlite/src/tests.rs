//! Integration tests against an in-memory store.

use chrono::Utc;
use roster_core::{
  Department, EducationLevel, NewSale, Role, Worker, WorkerStatus,
  person::Person,
  store::{DirectoryStore, NewAdmin, NewWorker, Provisioned, WorkerQuery},
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_worker(full_name: &str, email: &str) -> NewWorker {
  NewWorker {
    username:        email.to_owned(),
    email:           email.to_owned(),
    email_confirmed: true,
    full_name:       full_name.to_owned(),
    document_id:     "100200300".into(),
    address:         "Cra 7 # 12-34".into(),
    phone:           "3000000000".into(),
    position:        "Developer".into(),
    wage:            3500,
    status:          WorkerStatus::Active,
    education:       EducationLevel::Professional,
    department:      Department::Technology,
    profile:         "Backend".into(),
    registered_at:   Utc::now(),
  }
}

async fn created_worker(s: &SqliteStore, full_name: &str, email: &str) -> Worker {
  match s
    .create_worker(new_worker(full_name, email), "hash".into())
    .await
    .unwrap()
  {
    Provisioned::Created(w) => w,
    Provisioned::Rejected(d) => panic!("unexpected rejection: {d:?}"),
  }
}

fn amount(s: &str) -> Decimal { s.parse().unwrap() }

// ─── Workers ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_worker() {
  let s = store().await;

  let created = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  let fetched = s.worker(created.identity.person_id).await.unwrap().unwrap();

  assert_eq!(fetched.identity.person_id, created.identity.person_id);
  assert_eq!(fetched.identity.full_name, "Ana Gomez");
  assert_eq!(fetched.identity.email, "ana@x.com");
  assert_eq!(fetched.identity.username, "ana@x.com");
  assert!(fetched.identity.email_confirmed);
  assert_eq!(fetched.status, WorkerStatus::Active);
  assert_eq!(fetched.department, Department::Technology);
}

#[tokio::test]
async fn get_worker_missing_returns_none() {
  let s = store().await;
  assert!(s.worker(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_email_is_rejected_not_an_error() {
  let s = store().await;
  created_worker(&s, "Ana Gomez", "ana@x.com").await;

  // Same email with different case still violates the NOCASE unique index.
  let mut input = new_worker("Ana Clone", "ANA@X.COM");
  input.username = "other-username".into();
  let outcome = s.create_worker(input, "hash".into()).await.unwrap();

  match outcome {
    Provisioned::Rejected(descriptions) => {
      assert!(descriptions.iter().any(|d| d.contains("email")));
    }
    Provisioned::Created(_) => panic!("duplicate email must be rejected"),
  }
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  created_worker(&s, "Ana Gomez", "ana@x.com").await;

  let mut input = new_worker("Bob Diaz", "bob@x.com");
  input.username = "ana@x.com".into();
  let outcome = s.create_worker(input, "hash".into()).await.unwrap();

  assert!(matches!(outcome, Provisioned::Rejected(_)));
}

#[tokio::test]
async fn update_worker_persists_changes() {
  let s = store().await;
  let mut worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;

  worker.position = "Lead Developer".into();
  worker.wage = 5200;
  worker.status = WorkerStatus::OnVacation;
  let outcome = s.update_worker(&worker).await.unwrap();
  assert!(matches!(outcome, Provisioned::Created(())));

  let fetched = s.worker(worker.identity.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.position, "Lead Developer");
  assert_eq!(fetched.wage, 5200);
  assert_eq!(fetched.status, WorkerStatus::OnVacation);
}

#[tokio::test]
async fn update_missing_worker_is_rejected() {
  let s = store().await;
  let mut worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  worker.identity.person_id = Uuid::new_v4();

  let outcome = s.update_worker(&worker).await.unwrap();
  assert!(matches!(outcome, Provisioned::Rejected(_)));
}

#[tokio::test]
async fn update_worker_to_taken_email_is_rejected() {
  let s = store().await;
  created_worker(&s, "Ana Gomez", "ana@x.com").await;
  let mut bob = created_worker(&s, "Bob Diaz", "bob@x.com").await;

  bob.identity.email = "ana@x.com".into();
  let outcome = s.update_worker(&bob).await.unwrap();
  assert!(matches!(outcome, Provisioned::Rejected(_)));
}

#[tokio::test]
async fn delete_person_is_noop_when_absent() {
  let s = store().await;
  assert!(!s.delete_person(Uuid::new_v4()).await.unwrap());

  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  assert!(s.delete_person(worker.identity.person_id).await.unwrap());
  assert!(s.worker(worker.identity.person_id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_worker_cascades_to_sales_and_roles() {
  let s = store().await;
  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  let id = worker.identity.person_id;

  s.assign_role(id, Role::Worker).await.unwrap();
  s.create_sale(NewSale { worker_id: id, amount: amount("10"), sale_date: None })
    .await
    .unwrap()
    .unwrap();

  assert!(s.delete_person(id).await.unwrap());
  assert!(s.sales_by_worker(id).await.unwrap().is_empty());
  assert!(s.roles(id).await.unwrap().is_empty());
  assert_eq!(s.total_sales_amount().await.unwrap(), Decimal::ZERO);
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_query_returns_everything() {
  let s = store().await;
  created_worker(&s, "Ana Gomez", "ana@x.com").await;
  created_worker(&s, "Bob Diaz", "bob@x.com").await;
  created_worker(&s, "Carla Ruiz", "carla@x.com").await;

  let all = s.list_workers().await.unwrap();
  let page = s
    .search_workers(&WorkerQuery { text: Some("   ".into()), ..Default::default() })
    .await
    .unwrap();

  assert_eq!(page.total as usize, all.len());
  assert_eq!(page.workers.len(), 3);
}

#[tokio::test]
async fn search_matches_name_or_email_case_insensitively() {
  let s = store().await;
  created_worker(&s, "Ana Gomez", "ana@x.com").await;
  created_worker(&s, "Bob Diaz", "bob@x.com").await;

  let by_name = s
    .search_workers(&WorkerQuery { text: Some("GOM".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_name.total, 1);
  assert_eq!(by_name.workers[0].identity.full_name, "Ana Gomez");

  let by_email = s
    .search_workers(&WorkerQuery { text: Some("bob@".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_email.total, 1);
  assert_eq!(by_email.workers[0].identity.email, "bob@x.com");
}

#[tokio::test]
async fn search_pages_are_one_based() {
  let s = store().await;
  for i in 0..5 {
    created_worker(&s, &format!("Worker {i}"), &format!("w{i}@x.com")).await;
  }

  let first = s
    .search_workers(&WorkerQuery { text: None, page: 1, page_size: 2 })
    .await
    .unwrap();
  let third = s
    .search_workers(&WorkerQuery { text: None, page: 3, page_size: 2 })
    .await
    .unwrap();

  assert_eq!(first.total, 5);
  assert_eq!(first.workers.len(), 2);
  assert_eq!(third.workers.len(), 1);

  // Ordered by name, so pages never overlap.
  assert_ne!(
    first.workers[0].identity.person_id,
    third.workers[0].identity.person_id
  );
}

// ─── Counts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn counts_by_taxonomy() {
  let s = store().await;

  let mut a = new_worker("Ana Gomez", "ana@x.com");
  a.status = WorkerStatus::OnVacation;
  a.department = Department::Sales;
  a.education = EducationLevel::Masters;
  a.position = "Account Manager".into();
  s.create_worker(a, "hash".into()).await.unwrap();

  let mut b = new_worker("Bob Diaz", "bob@x.com");
  b.status = WorkerStatus::Active;
  b.position = "Backend Developer".into();
  s.create_worker(b, "hash".into()).await.unwrap();

  assert_eq!(s.count_workers().await.unwrap(), 2);
  assert_eq!(s.count_by_status(WorkerStatus::OnVacation).await.unwrap(), 1);
  assert_eq!(s.count_by_status(WorkerStatus::Inactive).await.unwrap(), 0);
  assert_eq!(s.count_by_department(Department::Sales).await.unwrap(), 1);
  assert_eq!(s.count_by_education(EducationLevel::Masters).await.unwrap(), 1);
  assert_eq!(s.count_by_position("developer").await.unwrap(), 1);
  assert_eq!(s.count_by_position("manager").await.unwrap(), 1);
  assert_eq!(s.count_by_position("janitor").await.unwrap(), 0);
}

// ─── Admins ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_admin_and_touch_login() {
  let s = store().await;

  let admin = s
    .create_admin(
      NewAdmin {
        username:        "admin@roster.local".into(),
        email:           "admin@roster.local".into(),
        email_confirmed: true,
        full_name:       "System Administrator".into(),
        document_id:     String::new(),
        address:         String::new(),
        phone:           String::new(),
      },
      "hash".into(),
    )
    .await
    .unwrap()
    .created()
    .unwrap();

  assert!(admin.last_login.is_none());

  let when = Utc::now();
  s.touch_admin_login(admin.identity.person_id, when).await.unwrap();

  let fetched = s.admin(admin.identity.person_id).await.unwrap().unwrap();
  assert_eq!(fetched.last_login, Some(when));

  // An admin id is not a worker id.
  assert!(s.worker(admin.identity.person_id).await.unwrap().is_none());
}

// ─── Sales ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_sale_requires_existing_worker() {
  let s = store().await;

  let none = s
    .create_sale(NewSale {
      worker_id: Uuid::new_v4(),
      amount:    amount("10"),
      sale_date: None,
    })
    .await
    .unwrap();
  assert!(none.is_none());
}

#[tokio::test]
async fn sales_by_worker_and_total() {
  let s = store().await;
  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  let other = created_worker(&s, "Bob Diaz", "bob@x.com").await;
  let id = worker.identity.person_id;

  s.create_sale(NewSale { worker_id: id, amount: amount("100.50"), sale_date: None })
    .await
    .unwrap()
    .unwrap();
  s.create_sale(NewSale { worker_id: id, amount: amount("49.50"), sale_date: None })
    .await
    .unwrap()
    .unwrap();
  s.create_sale(NewSale {
    worker_id: other.identity.person_id,
    amount:    amount("7.25"),
    sale_date: None,
  })
  .await
  .unwrap()
  .unwrap();

  let records = s.sales_by_worker(id).await.unwrap();
  assert_eq!(records.len(), 2);
  assert!(records.iter().all(|r| r.sale.worker_id == id));
  assert!(records.iter().all(|r| r.worker.identity.email == "ana@x.com"));

  let theirs: Decimal = records.iter().map(|r| r.sale.amount).sum();
  assert_eq!(theirs, amount("150.00"));

  assert_eq!(s.total_sales_amount().await.unwrap(), amount("157.75"));
  assert_eq!(s.sales().await.unwrap().len(), 3);
}

#[tokio::test]
async fn total_sales_amount_is_zero_without_sales() {
  let s = store().await;
  assert_eq!(s.total_sales_amount().await.unwrap(), Decimal::ZERO);
}

#[tokio::test]
async fn sale_roundtrip_update_delete() {
  let s = store().await;
  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;

  let mut sale = s
    .create_sale(NewSale {
      worker_id: worker.identity.person_id,
      amount:    amount("19.99"),
      sale_date: None,
    })
    .await
    .unwrap()
    .unwrap();

  let fetched = s.sale(sale.sale_id).await.unwrap().unwrap();
  assert_eq!(fetched.sale.amount, amount("19.99"));
  assert_eq!(fetched.worker.identity.person_id, worker.identity.person_id);

  sale.amount = amount("25.00");
  assert!(s.update_sale(&sale).await.unwrap());
  assert_eq!(
    s.sale(sale.sale_id).await.unwrap().unwrap().sale.amount,
    amount("25.00")
  );

  assert!(s.delete_sale(sale.sale_id).await.unwrap());
  assert!(s.sale(sale.sale_id).await.unwrap().is_none());
  // Deleting again is a no-op, not an error.
  assert!(!s.delete_sale(sale.sale_id).await.unwrap());
}

// ─── Identity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn credential_lookup_is_case_insensitive() {
  let s = store().await;
  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  s.assign_role(worker.identity.person_id, Role::Worker).await.unwrap();

  let cred = s
    .find_credential_by_email("ANA@X.COM")
    .await
    .unwrap()
    .expect("credential");

  assert_eq!(cred.person_id, worker.identity.person_id);
  assert_eq!(cred.password_hash, "hash");
  assert_eq!(cred.roles, vec![Role::Worker]);

  assert!(s.find_credential_by_email("nobody@x.com").await.unwrap().is_none());
}

#[tokio::test]
async fn email_exists_ignores_case() {
  let s = store().await;
  created_worker(&s, "Ana Gomez", "Ana@X.com").await;

  assert!(s.email_exists("ana@x.com").await.unwrap());
  assert!(s.email_exists(" ANA@X.COM ").await.unwrap());
  assert!(!s.email_exists("bob@x.com").await.unwrap());
}

#[tokio::test]
async fn assign_role_is_idempotent() {
  let s = store().await;
  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;
  let id = worker.identity.person_id;

  s.assign_role(id, Role::Worker).await.unwrap();
  s.assign_role(id, Role::Worker).await.unwrap();
  s.assign_role(id, Role::Admin).await.unwrap();

  assert_eq!(s.roles(id).await.unwrap(), vec![Role::Admin, Role::Worker]);
}

#[tokio::test]
async fn person_lookup_is_tagged_by_kind() {
  let s = store().await;
  let worker = created_worker(&s, "Ana Gomez", "ana@x.com").await;

  let person = s.person(worker.identity.person_id).await.unwrap().unwrap();
  assert!(matches!(person, Person::Worker(_)));
  assert_eq!(person.identity().email, "ana@x.com");
  assert!(s.person(Uuid::new_v4()).await.unwrap().is_none());
}
