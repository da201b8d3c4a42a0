mod common;

use anyhow::Result;
use common::{recurrence, register, test_service, transaction};
use cyberfinance::application::{AppError, CategoryInput, GoalInput, ProfileInput};
use cyberfinance::domain::{DEFAULT_GOAL_CATEGORY, EntryKind, Frequency};
use uuid::Uuid;

#[tokio::test]
async fn test_register_user_rejects_duplicate_email() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let user = service
        .register_user("Ana".to_string(), "  Ana@Example.com ".to_string())
        .await?;
    assert_eq!(user.email, "ana@example.com");

    let found = service.get_user_by_email("ANA@example.com").await?;
    assert_eq!(found.id, user.id);

    let err = service
        .register_user("Other".to_string(), "ana@EXAMPLE.com".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmailAlreadyRegistered(_)));

    let err = service
        .register_user("Nobody".to_string(), "not-an-email".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    Ok(())
}

#[tokio::test]
async fn test_update_profile() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let updated = service
        .update_profile(
            user.id,
            ProfileInput {
                name: "Ana Maria".to_string(),
                profile_picture_url: Some("https://img.example.com/ana.png".to_string()),
            },
        )
        .await?;
    assert_eq!(updated.name, "Ana Maria");

    let reloaded = service.get_user(user.id).await?;
    assert_eq!(reloaded.name, "Ana Maria");
    assert_eq!(
        reloaded.profile_picture_url.as_deref(),
        Some("https://img.example.com/ana.png")
    );

    Ok(())
}

#[tokio::test]
async fn test_transaction_lifecycle() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let tx = service
        .create_transaction(
            user.id,
            transaction("Coffee", 450, EntryKind::Expense, "2025-07-01"),
        )
        .await?;
    assert_eq!(service.list_transactions(user.id).await?.len(), 1);

    let mut input = transaction("Coffee beans", 1800, EntryKind::Expense, "2025-07-02");
    input.is_future = true;
    let updated = service.update_transaction(user.id, tx.id, input).await?;
    assert_eq!(updated.id, tx.id);

    let listed = service.list_transactions(user.id).await?;
    assert_eq!(listed[0].description, "Coffee beans");
    assert_eq!(listed[0].amount, 1800);
    assert!(listed[0].is_future);
    assert_eq!(service.net_balance(user.id).await?, -1800);

    let removed = service.delete_transaction(user.id, tx.id).await?;
    assert_eq!(removed.description, "Coffee beans");
    assert!(service.list_transactions(user.id).await?.is_empty());

    let err = service.delete_transaction(user.id, tx.id).await.unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_transaction_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let err = service
        .create_transaction(user.id, transaction("Zero", 0, EntryKind::Income, "2025-07-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    let err = service
        .create_transaction(user.id, transaction("  ", 100, EntryKind::Income, "2025-07-01"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    Ok(())
}

#[tokio::test]
async fn test_records_are_isolated_between_users() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let alice = register(&service, "Alice").await?;
    let bob = register(&service, "Bob").await?;

    let tx = service
        .create_transaction(
            alice.id,
            transaction("Salary", 100000, EntryKind::Income, "2025-07-01"),
        )
        .await?;
    let category = service
        .create_category(
            alice.id,
            CategoryInput {
                name: "Food".to_string(),
                color: "#ff0000".to_string(),
            },
        )
        .await?;
    let rule = service
        .create_recurrence(
            alice.id,
            recurrence("Rent", 80000, EntryKind::Expense, Frequency::Monthly, "2025-01-01"),
        )
        .await?;

    assert!(service.list_transactions(bob.id).await?.is_empty());
    assert!(service.list_categories(bob.id).await?.is_empty());
    assert!(service.list_recurrences(bob.id).await?.is_empty());

    // Bob can neither change nor remove Alice's records.
    let err = service
        .update_transaction(
            bob.id,
            tx.id,
            transaction("Stolen", 1, EntryKind::Income, "2025-07-01"),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TransactionNotFound(_)));

    let err = service.delete_category(bob.id, category.id).await.unwrap_err();
    assert!(matches!(err, AppError::CategoryNotFound(_)));

    let err = service.delete_recurrence(bob.id, rule.id).await.unwrap_err();
    assert!(matches!(err, AppError::RecurrenceNotFound(_)));

    assert_eq!(service.list_transactions(alice.id).await?[0].description, "Salary");
    assert_eq!(service.list_categories(alice.id).await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_category_lifecycle() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let category = service
        .create_category(
            user.id,
            CategoryInput {
                name: "Food".to_string(),
                color: "#ff0000".to_string(),
            },
        )
        .await?;

    service
        .update_category(
            user.id,
            category.id,
            CategoryInput {
                name: "Groceries".to_string(),
                color: "#00ff00".to_string(),
            },
        )
        .await?;

    let categories = service.list_categories(user.id).await?;
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Groceries");
    assert_eq!(categories[0].color, "#00ff00");

    service.delete_category(user.id, category.id).await?;
    assert!(service.list_categories(user.id).await?.is_empty());

    let err = service
        .update_category(
            user.id,
            Uuid::new_v4(),
            CategoryInput {
                name: "Ghost".to_string(),
                color: "#000000".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::CategoryNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_goal_lifecycle() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let goal = service
        .create_goal(
            user.id,
            GoalInput {
                name: "Trip".to_string(),
                current: 25000,
                target: 100000,
                category: None,
            },
        )
        .await?;
    assert_eq!(goal.category, DEFAULT_GOAL_CATEGORY);
    assert_eq!(goal.progress(), 25.0);

    let updated = service
        .update_goal(
            user.id,
            goal.id,
            GoalInput {
                name: "Trip".to_string(),
                current: 150000,
                target: 100000,
                category: Some("Travel".to_string()),
            },
        )
        .await?;
    assert_eq!(updated.progress(), 100.0);

    let goals = service.list_goals(user.id).await?;
    assert_eq!(goals[0].current, 150000);
    assert_eq!(goals[0].category, "Travel");

    let err = service
        .create_goal(
            user.id,
            GoalInput {
                name: "Nothing".to_string(),
                current: 0,
                target: 0,
                category: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    service.delete_goal(user.id, goal.id).await?;
    assert!(service.list_goals(user.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_recurrence_lifecycle() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let mut input = recurrence("Netflix", 3990, EntryKind::Expense, Frequency::Monthly, "2025-03-10");
    input.end_date = Some("2026-03-10T00:00:00.000Z".to_string());
    let rule = service.create_recurrence(user.id, input).await?;
    assert!(rule.active);

    let mut paused = recurrence("Netflix", 4490, EntryKind::Expense, Frequency::Monthly, "2025-03-10");
    paused.active = false;
    service.update_recurrence(user.id, rule.id, paused).await?;

    let rules = service.list_recurrences(user.id).await?;
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].amount, 4490);
    assert!(!rules[0].active);
    assert!(rules[0].end_date.is_none());

    service.delete_recurrence(user.id, rule.id).await?;
    assert!(service.list_recurrences(user.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_recurrence_date_validation() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let user = register(&service, "Ana").await?;

    let bad_start = recurrence("Rent", 1000, EntryKind::Expense, Frequency::Monthly, "soon");
    let err = service.create_recurrence(user.id, bad_start).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidDate(_)));

    let mut backwards = recurrence("Rent", 1000, EntryKind::Expense, Frequency::Monthly, "2025-06-01");
    backwards.end_date = Some("2025-01-01".to_string());
    let err = service.create_recurrence(user.id, backwards).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidDate(_)));

    let mut blank_end = recurrence("Rent", 1000, EntryKind::Expense, Frequency::Monthly, "2025-06-01");
    blank_end.end_date = Some("   ".to_string());
    let rule = service.create_recurrence(user.id, blank_end).await?;
    assert!(rule.end_date.is_none());

    Ok(())
}
