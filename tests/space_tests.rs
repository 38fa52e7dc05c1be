use sharetask::auth::register;
use std::collections::BTreeMap;

use sharetask::models::{Database, Role, ShareSpace};
use sharetask::spaces::*;
use sharetask::tasks::{add_task, update_task, TaskTarget, TaskUpdate};
use sharetask::Error;

use chrono::Local;

fn setup() -> (Database, String, String, String) {
    let mut db = Database::default();
    let alice = register(&mut db, "alice@example.com", "secret1", "secret1", 6).unwrap().id;
    let bob = register(&mut db, "bob@example.com", "secret1", "secret1", 6).unwrap().id;
    let carol = register(&mut db, "carol@example.com", "secret1", "secret1", 6).unwrap().id;
    (db, alice, bob, carol)
}

#[test]
fn test_share_code_shape() {
    let code = generate_share_code(6);
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
}

#[test]
fn test_create_space_makes_owner() {
    let (mut db, alice, _, _) = setup();
    let space = create_space(&mut db, &alice, "  Family ", 6).unwrap();
    assert_eq!(space.name, "Family");
    assert_eq!(space.role_of(&alice), Some(Role::Owner));
    assert_eq!(space.share_code.len(), 6);
    assert!(matches!(create_space(&mut db, &alice, "   ", 6), Err(Error::EmptyName(_))));
}

#[test]
fn test_join_by_code_as_viewer() {
    let (mut db, alice, bob, _) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();

    let joined = join_space(&mut db, &bob, &space.share_code.to_lowercase()).unwrap();
    assert_eq!(joined.id, space.id);
    assert_eq!(joined.role_of(&bob), Some(Role::Viewer));

    assert!(matches!(join_space(&mut db, &bob, "NOPE00"), Err(Error::InvalidCode(_))));
}

#[test]
fn test_rejoining_keeps_role() {
    let (mut db, alice, _, _) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    let again = join_space(&mut db, &alice, &space.share_code).unwrap();
    assert_eq!(again.role_of(&alice), Some(Role::Owner));
}

#[test]
fn test_spaces_for_user_and_members() {
    let (mut db, alice, bob, carol) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    join_space(&mut db, &bob, &space.share_code).unwrap();

    assert_eq!(spaces_for_user(&db, &bob).len(), 1);
    assert!(spaces_for_user(&db, &carol).is_empty());

    let stored = db.space(&space.id).unwrap();
    let rows = members(&db, stored);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].role, Role::Owner);
    assert_eq!(rows[0].email, "alice@example.com");
    assert_eq!(rows[1].email, "bob@example.com");

    assert_eq!(email_for(&db, "ghost"), "Unknown");
}

#[test]
fn test_role_updates_are_gated() {
    let (mut db, alice, bob, carol) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    join_space(&mut db, &bob, &space.share_code).unwrap();
    join_space(&mut db, &carol, &space.share_code).unwrap();

    // A viewer cannot promote anyone.
    assert!(matches!(
        update_member_role(&mut db, &bob, &space.id, &carol, Role::Editor),
        Err(Error::PermissionDenied(_))
    ));

    update_member_role(&mut db, &alice, &space.id, &bob, Role::Editor).unwrap();
    assert_eq!(db.space(&space.id).unwrap().role_of(&bob), Some(Role::Editor));

    // Editors manage other non-owners but never the owner.
    update_member_role(&mut db, &bob, &space.id, &carol, Role::Editor).unwrap();
    assert!(matches!(
        update_member_role(&mut db, &bob, &space.id, &alice, Role::Viewer),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        update_member_role(&mut db, &alice, &space.id, &bob, Role::Owner),
        Err(Error::PermissionDenied(_))
    ));
}

#[test]
fn test_find_member_by_email_or_prefix() {
    let (mut db, alice, bob, carol) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    join_space(&mut db, &bob, &space.share_code).unwrap();
    let stored = db.space(&space.id).unwrap().clone();

    assert_eq!(find_member(&db, &stored, "BOB@example.com").unwrap(), bob);
    assert_eq!(find_member(&db, &stored, &alice).unwrap(), alice);
    assert!(matches!(find_member(&db, &stored, "carol@example.com"), Err(Error::NotAMember(_))));
    assert!(matches!(find_member(&db, &stored, &carol), Err(Error::NotAMember(_))));
}

#[test]
fn test_only_owner_renames_and_deletes() {
    let (mut db, alice, bob, _) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    join_space(&mut db, &bob, &space.share_code).unwrap();
    update_member_role(&mut db, &alice, &space.id, &bob, Role::Editor).unwrap();

    assert!(matches!(rename_space(&mut db, &bob, &space.id, "Mine"), Err(Error::PermissionDenied(_))));
    assert!(matches!(delete_space(&mut db, &bob, &space.id), Err(Error::PermissionDenied(_))));

    rename_space(&mut db, &alice, &space.id, "Office").unwrap();
    assert_eq!(db.space(&space.id).unwrap().name, "Office");
}

#[test]
fn test_delete_space_cascades() {
    let (mut db, alice, bob, _) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    join_space(&mut db, &bob, &space.share_code).unwrap();
    let shared = add_task(&mut db, &bob, "Shared", TaskTarget::Space(space.id.clone()), Local::now()).unwrap();
    sharetask::tasks::add_subtask(&mut db, &bob, &shared.id, "step").unwrap();
    add_task(&mut db, &alice, "Personal", TaskTarget::MyDay, Local::now()).unwrap();

    let removed = delete_space(&mut db, &alice, &space.id).unwrap();
    assert_eq!(removed, 1);
    assert!(db.share_spaces.is_empty());
    assert_eq!(db.tasks.len(), 1);
    assert!(db.subtasks.is_empty());
}

#[test]
fn test_outsider_sees_nothing() {
    let (mut db, alice, _, carol) = setup();
    let space = create_space(&mut db, &alice, "Work", 6).unwrap();
    assert!(matches!(visible_space(&db, &carol, &space.id), Err(Error::NotFound { .. })));
    assert!(matches!(delete_space(&mut db, &carol, &space.id), Err(Error::NotFound { .. })));
}

#[test]
fn test_share_codes_run_out() {
    let (mut db, alice, _, _) = setup();
    for i in 0..36 {
        create_space(&mut db, &alice, &format!("Space {i}"), 1).unwrap();
    }
    let mut codes: Vec<&str> = db.share_spaces.iter().map(|s| s.share_code.as_str()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 36);

    let err = create_space(&mut db, &alice, "One too many", 1).unwrap_err();
    assert!(matches!(err, Error::ShareCodesExhausted(1)));
    assert_eq!(db.share_spaces.len(), 36);
}

#[test]
fn test_find_member_rejects_blank_key() {
    let (mut db, alice, _, _) = setup();
    let space = create_space(&mut db, &alice, "Solo", 6).unwrap();
    let task = add_task(&mut db, &alice, "Chore", TaskTarget::Space(space.id.clone()), Local::now()).unwrap();
    let stored = db.space(&space.id).unwrap().clone();

    assert!(matches!(find_member(&db, &stored, ""), Err(Error::NotAMember(_))));
    assert!(matches!(find_member(&db, &stored, "   "), Err(Error::NotAMember(_))));

    let update = TaskUpdate { assignee: Some(" ".into()), ..Default::default() };
    assert!(matches!(update_task(&mut db, &alice, &task.id, update, Local::now()), Err(Error::NotAMember(_))));
}

#[test]
fn test_find_member_ambiguous_prefix() {
    let db = Database::default();
    let mut members = BTreeMap::new();
    members.insert("u1a".to_string(), Role::Owner);
    members.insert("u1b".to_string(), Role::Viewer);
    members.insert("u2".to_string(), Role::Editor);
    let space = ShareSpace {
        id: "s1".into(),
        name: "Team".into(),
        user_id: "u1a".into(),
        share_code: "ABCDEF".into(),
        members,
    };

    assert!(matches!(find_member(&db, &space, "u1"), Err(Error::AmbiguousId { .. })));
    assert_eq!(find_member(&db, &space, "u1b").unwrap(), "u1b");
    assert_eq!(find_member(&db, &space, "u2").unwrap(), "u2");
}
