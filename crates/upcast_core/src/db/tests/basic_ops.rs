//! Basic database CRUD tests.

use super::*;

fn upsert(fid: u64, username: &str, display_name: Option<&str>) -> UpsertUserRequest {
    UpsertUserRequest {
        fid,
        username: username.to_string(),
        display_name: display_name.map(str::to_string),
        pfp_url: None,
        bio: None,
    }
}

#[test]
fn from_shared_handles_see_the_same_rows() {
    let (db, _temp) = setup_temp_db();
    let user = seed_user(&db, 7, "alice");

    let other = Database::from_shared(db.db.clone());
    let fetched = other.users.get(&user.id).expect("get").expect("user");
    assert_eq!(fetched, user);
}

#[test]
fn upsert_by_fid_creates_then_refreshes_same_row() {
    let (db, _temp) = setup_temp_db();

    let (created, is_new) = db
        .users
        .upsert_by_fid(&upsert(42, "alice", None))
        .expect("create");
    assert!(is_new);
    assert_eq!(created.label(), "alice");

    let (refreshed, is_new) = db
        .users
        .upsert_by_fid(&upsert(42, "alice2", Some("Alice")))
        .expect("refresh");
    assert!(!is_new);
    assert_eq!(refreshed.id, created.id);
    assert_eq!(refreshed.username, "alice2");
    assert_eq!(refreshed.label(), "Alice");

    let by_fid = db.users.get_by_fid(42).expect("get").expect("user");
    assert_eq!(by_fid.id, created.id);
    assert!(db.users.get_by_fid(43).expect("get").is_none());
}

#[test]
fn upsert_rejects_zero_fid_and_blank_username() {
    let (db, _temp) = setup_temp_db();
    assert!(matches!(
        db.users.upsert_by_fid(&upsert(0, "alice", None)),
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        db.users.upsert_by_fid(&upsert(5, "   ", None)),
        Err(AppError::Validation(_))
    ));
}

#[test]
fn category_slugs_are_unique_and_in_use_categories_cannot_be_deleted() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");

    let tools = db
        .categories
        .create(CreateCategoryRequest {
            name: "Developer Tools".to_string(),
            slug: None,
            description: None,
        })
        .expect("create");
    assert_eq!(tools.slug, "developer-tools");

    let dupe = db.categories.create(CreateCategoryRequest {
        name: "developer tools".to_string(),
        slug: None,
        description: None,
    });
    assert!(matches!(dupe, Err(AppError::Validation(_))));

    let mut req = CreateProjectRequest {
        name: "Upcast".to_string(),
        tagline: "Ship it".to_string(),
        description: None,
        website_url: None,
        image_url: None,
        category_id: Some(tools.id.clone()),
        creator_id: owner.id.clone(),
    };
    let project = db.projects.create(req).expect("project");

    assert!(matches!(
        db.categories.delete(&tools.id),
        Err(AppError::Validation(_))
    ));

    assert!(db.projects.delete(&project.id).expect("delete project"));
    assert!(db.categories.delete(&tools.id).expect("delete category"));
    assert!(!db.categories.delete(&tools.id).expect("second delete"));

    req = CreateProjectRequest {
        name: "Orphan".to_string(),
        tagline: "No category".to_string(),
        description: None,
        website_url: None,
        image_url: None,
        category_id: Some(tools.id),
        creator_id: owner.id,
    };
    assert!(matches!(
        db.projects.create(req),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn project_create_requires_existing_user_and_valid_fields() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");

    let missing_user = db.projects.create(CreateProjectRequest {
        name: "Ghost".to_string(),
        tagline: "Nobody owns me".to_string(),
        description: None,
        website_url: None,
        image_url: None,
        category_id: None,
        creator_id: "no-such-user".to_string(),
    });
    assert!(matches!(missing_user, Err(AppError::NotFound(_))));

    let too_long = db.projects.create(CreateProjectRequest {
        name: "x".repeat(101),
        tagline: "fine".to_string(),
        description: None,
        website_url: None,
        image_url: None,
        category_id: None,
        creator_id: owner.id,
    });
    assert!(matches!(too_long, Err(AppError::Validation(_))));
}

#[test]
fn project_update_patches_metadata_and_keeps_counters() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");
    let fan = seed_user(&db, 2, "fan");
    let project = seed_project(&db, &owner, "Upcast");

    ToggleOps::toggle(
        &db,
        Ledger::ProjectUpvote,
        &fan.id,
        &project.id,
        &RecordingHook::default(),
    )
    .expect("upvote");

    let updated = db
        .projects
        .update(
            &project.id,
            UpdateProjectRequest {
                tagline: Some("  A better tagline ".to_string()),
                website_url: Some("https://upcast.dev".to_string()),
                ..Default::default()
            },
        )
        .expect("update")
        .expect("project exists");
    assert_eq!(updated.tagline, "A better tagline");
    assert_eq!(updated.website_url.as_deref(), Some("https://upcast.dev"));
    assert_eq!(updated.upvote_count, 1);

    let cleared = db
        .projects
        .update(
            &project.id,
            UpdateProjectRequest {
                website_url: Some(String::new()),
                ..Default::default()
            },
        )
        .expect("update")
        .expect("project exists");
    assert_eq!(cleared.website_url, None);

    assert!(db
        .projects
        .update("missing", UpdateProjectRequest::default())
        .expect("update")
        .is_none());
    assert_counters_match_memberships(&db);
}

#[test]
fn project_list_orders_by_recency_or_votes_with_offset() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");
    let fan = seed_user(&db, 2, "fan");
    let hook = RecordingHook::default();

    let first = seed_project(&db, &owner, "First");
    thread::sleep(std::time::Duration::from_millis(2));
    let second = seed_project(&db, &owner, "Second");
    thread::sleep(std::time::Duration::from_millis(2));
    let third = seed_project(&db, &owner, "Third");

    ToggleOps::toggle(&db, Ledger::ProjectUpvote, &fan.id, &first.id, &hook).expect("upvote");
    ToggleOps::toggle(&db, Ledger::ProjectUpvote, &owner.id, &first.id, &hook).expect("upvote");
    ToggleOps::toggle(&db, Ledger::ProjectUpvote, &fan.id, &second.id, &hook).expect("upvote");

    let recent = db.projects.list(&ListProjectsQuery::default()).expect("list");
    let names: Vec<_> = recent.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Third", "Second", "First"]);

    let top = db
        .projects
        .list(&ListProjectsQuery {
            sort: Some(ProjectSort::Top),
            ..Default::default()
        })
        .expect("list");
    let ids: Vec<_> = top.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(
        ids,
        [first.id.as_str(), second.id.as_str(), third.id.as_str()]
    );

    let paged = db
        .projects
        .list(&ListProjectsQuery {
            limit: Some(1),
            offset: Some(1),
            ..Default::default()
        })
        .expect("list");
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0].id, second.id);
}

#[test]
fn project_delete_cascades_comments_and_memberships() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");
    let fan = seed_user(&db, 2, "fan");
    let project = seed_project(&db, &owner, "Doomed");
    let hook = RecordingHook::default();

    ToggleOps::toggle(&db, Ledger::ProjectUpvote, &fan.id, &project.id, &hook).expect("upvote");
    ToggleOps::toggle(&db, Ledger::ProjectSave, &fan.id, &project.id, &hook).expect("save");
    db.comments
        .create(
            &project.id,
            CreateCommentRequest {
                user_id: fan.id.clone(),
                body: "nice".to_string(),
            },
        )
        .expect("comment");

    assert!(db.projects.delete(&project.id).expect("delete"));
    assert!(db.projects.get(&project.id).expect("get").is_none());
    assert!(db
        .comments
        .list_for_project(&project.id)
        .expect("comments")
        .is_empty());
    for ledger in [Ledger::ProjectUpvote, Ledger::ProjectSave] {
        assert_eq!(
            ToggleOps::membership_count(&db, ledger, &project.id).expect("count"),
            0
        );
        assert!(ToggleOps::targets_for_actor(&db, ledger, &fan.id)
            .expect("targets")
            .is_empty());
    }
    assert!(!db.projects.delete(&project.id).expect("second delete"));
}

#[test]
fn creator_profile_is_one_per_existing_user() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");
    let creator = seed_creator(&db, &owner);
    assert_eq!(creator.upvote_count, 0);

    let dupe = db.creators.create(crate::models::creator::CreateCreatorRequest {
        user_id: owner.id.clone(),
        name: "again".to_string(),
        bio: None,
        avatar_url: None,
    });
    assert!(matches!(dupe, Err(AppError::Validation(_))));

    let orphan = db.creators.create(crate::models::creator::CreateCreatorRequest {
        user_id: "nobody".to_string(),
        name: "ghost".to_string(),
        bio: None,
        avatar_url: None,
    });
    assert!(matches!(orphan, Err(AppError::NotFound(_))));
}

#[test]
fn comments_list_oldest_first_and_only_author_deletes() {
    let (db, _temp) = setup_temp_db();
    let owner = seed_user(&db, 1, "owner");
    let fan = seed_user(&db, 2, "fan");
    let project = seed_project(&db, &owner, "Chatty");

    let (first, _, _) = db
        .comments
        .create(
            &project.id,
            CreateCommentRequest {
                user_id: fan.id.clone(),
                body: "first".to_string(),
            },
        )
        .expect("comment");
    thread::sleep(std::time::Duration::from_millis(2));
    db.comments
        .create(
            &project.id,
            CreateCommentRequest {
                user_id: owner.id.clone(),
                body: "second".to_string(),
            },
        )
        .expect("comment");

    let bodies: Vec<_> = db
        .comments
        .list_for_project(&project.id)
        .expect("list")
        .into_iter()
        .map(|c| c.body)
        .collect();
    assert_eq!(bodies, ["first", "second"]);

    assert!(!db.comments.delete(&first.id, &owner.id).expect("delete"));
    assert!(db.comments.delete(&first.id, &fan.id).expect("delete"));
    assert_eq!(db.comments.list_for_project(&project.id).expect("list").len(), 1);

    let blank = db.comments.create(
        &project.id,
        CreateCommentRequest {
            user_id: fan.id.clone(),
            body: "   ".to_string(),
        },
    );
    assert!(matches!(blank, Err(AppError::Validation(_))));
    let missing = db.comments.create(
        "missing",
        CreateCommentRequest {
            user_id: fan.id,
            body: "hello".to_string(),
        },
    );
    assert!(matches!(missing, Err(AppError::NotFound(_))));
}
