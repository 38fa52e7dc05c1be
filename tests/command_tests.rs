use sharetask::commands::*;
use sharetask::config::Config;
use sharetask::models::Role;
use sharetask::storage::Store;
use sharetask::tasks::TaskUpdate;
use sharetask::Error;
use clap_complete::Shell;
use tempfile::TempDir;

fn with_test_app<F>(f: F)
where
    F: FnOnce(&App),
{
    let dir = TempDir::new().unwrap();
    let store = Store::at(dir.path().join("db.json"));
    let app = App::new(store, Config::default());
    f(&app);
}

#[test]
fn test_commands_require_sign_in() {
    with_test_app(|app| {
        assert!(matches!(cmd_myday(app), Err(Error::NotSignedIn)));
        assert!(matches!(cmd_task_add(app, "x", None, None), Err(Error::NotSignedIn)));
    });
}

#[test]
fn test_register_add_and_complete() {
    with_test_app(|app| {
        cmd_register(app, "alice@example.com", "secret1", "secret1").unwrap();
        let session = app.store.load_session().unwrap().unwrap();
        assert_eq!(session.email, "alice@example.com");

        cmd_task_add(app, "Test Task", None, None).unwrap();
        let db = app.store.load().unwrap();
        assert_eq!(db.tasks.len(), 1);
        assert_eq!(db.tasks[0].name, "Test Task");
        assert_eq!(db.tasks[0].user_id, session.user_id);

        let id = db.tasks[0].id.clone();
        cmd_task_complete(app, &id[..8], true).unwrap();
        assert!(app.store.load().unwrap().tasks[0].completed);

        cmd_myday(app).unwrap();
        cmd_week(app).unwrap();
        cmd_all(app).unwrap();
        cmd_agenda(app).unwrap();
        cmd_task_show(app, &id).unwrap();
    });
}

#[test]
fn test_logout_and_login() {
    with_test_app(|app| {
        cmd_register(app, "bob@example.com", "secret1", "secret1").unwrap();
        cmd_logout(app).unwrap();
        assert!(app.store.load_session().unwrap().is_none());
        assert!(matches!(cmd_whoami(app), Err(Error::NotSignedIn)));

        assert!(matches!(cmd_login(app, "bob@example.com", "nope"), Err(Error::InvalidCredentials)));
        cmd_login(app, "bob@example.com", "secret1").unwrap();
        cmd_whoami(app).unwrap();
    });
}

#[test]
fn test_list_commands() {
    with_test_app(|app| {
        cmd_register(app, "carol@example.com", "secret1", "secret1").unwrap();
        cmd_list_add(app, "Groceries").unwrap();
        let list_id = app.store.load().unwrap().lists[0].id.clone();

        cmd_task_add(app, "Eggs", Some(list_id.clone()), None).unwrap();
        cmd_list_show(app, &list_id).unwrap();
        cmd_list_rename(app, &list_id, "Food").unwrap();
        cmd_list_ls(app).unwrap();

        let db = app.store.load().unwrap();
        assert_eq!(db.lists[0].name, "Food");
        assert_eq!(db.tasks[0].list_id.as_deref(), Some(list_id.as_str()));

        cmd_list_remove(app, &list_id).unwrap();
        let db = app.store.load().unwrap();
        assert!(db.lists.is_empty());
        assert!(db.tasks.is_empty());
    });
}

#[test]
fn test_share_space_flow() {
    with_test_app(|app| {
        cmd_register(app, "owner@example.com", "secret1", "secret1").unwrap();
        cmd_space_create(app, "Family").unwrap();
        let space = app.store.load().unwrap().share_spaces[0].clone();
        cmd_task_add(app, "Plan trip", None, Some(space.id.clone())).unwrap();

        cmd_register(app, "guest@example.com", "secret1", "secret1").unwrap();
        cmd_space_join(app, &space.share_code).unwrap();
        let task_id = app.store.load().unwrap().tasks[0].id.clone();

        // Guest joined as viewer.
        assert!(matches!(cmd_task_complete(app, &task_id, true), Err(Error::PermissionDenied(_))));
        assert!(matches!(cmd_space_rename(app, &space.id, "Ours"), Err(Error::PermissionDenied(_))));
        cmd_space_show(app, &space.id, false).unwrap();
        cmd_space_members(app, &space.id).unwrap();

        cmd_login(app, "owner@example.com", "secret1").unwrap();
        cmd_space_role(app, &space.id, "guest@example.com", Role::Editor).unwrap();
        let update = TaskUpdate { assignee: Some("guest@example.com".into()), ..Default::default() };
        cmd_task_edit(app, &task_id, update).unwrap();

        cmd_login(app, "guest@example.com", "secret1").unwrap();
        cmd_task_complete(app, &task_id, true).unwrap();
        cmd_subtask_add(app, &task_id, "Book hotel").unwrap();
        cmd_space_show(app, &space.id, true).unwrap();

        let db = app.store.load().unwrap();
        assert!(db.tasks[0].completed);
        assert_eq!(db.subtasks.len(), 1);

        cmd_login(app, "owner@example.com", "secret1").unwrap();
        cmd_space_remove(app, &space.id).unwrap();
        let db = app.store.load().unwrap();
        assert!(db.share_spaces.is_empty());
        assert!(db.tasks.is_empty());
        assert!(db.subtasks.is_empty());
    });
}

#[test]
fn test_reset_force() {
    with_test_app(|app| {
        cmd_register(app, "dave@example.com", "secret1", "secret1").unwrap();
        assert!(app.store.db_path().exists());
        cmd_reset(app, true).unwrap();
        assert!(!app.store.db_path().exists());
        assert!(app.store.load_session().unwrap().is_none());
        assert!(app.store.load().unwrap().users.is_empty());
    });
}

#[test]
fn test_short_ids_cut_on_characters() {
    assert_eq!(short("0123456789abcdef"), "01234567");
    assert_eq!(short("abc"), "abc");
    assert_eq!(short("ééééééééééé"), "éééééééé");
}

#[test]
fn test_parse_shell() {
    assert!(matches!(parse_shell("bash"), Ok(Shell::Bash)));
    assert!(matches!(parse_shell("PowerShell"), Ok(Shell::PowerShell)));
    let err = parse_shell("tcsh").unwrap_err();
    assert!(matches!(err, Error::UnsupportedShell(_)));
    assert_eq!(err.exit_code(), 1);
}
