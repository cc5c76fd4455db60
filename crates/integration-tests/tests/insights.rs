//! Insights aggregation over the in-memory store.

#![allow(clippy::unwrap_used)]

use vitrine_integration_tests::{TestContext, user};

#[tokio::test]
async fn test_insights_counts_and_ordering() {
    let ctx = TestContext::new();
    let b = ctx.create_item("Item B", "misc", Vec::new()).await;
    let a = ctx.create_item("Item A", "misc", Vec::new()).await;
    let u1 = user("user_1_u1");
    let u2 = user("user_2_u2");

    let favourites = ctx.state.favourites();
    favourites.toggle(a.id, &u1).await.unwrap();
    favourites.toggle(a.id, &u2).await.unwrap();
    favourites.toggle(b.id, &u1).await.unwrap();

    let insights = ctx.state.insights().compute().await.unwrap();

    assert_eq!(insights.total_favourites, 3);
    assert_eq!(insights.total_unique_users, 2);

    let ranked: Vec<_> = insights
        .most_favourited_items
        .iter()
        .map(|f| (f.item.id, f.favourite_count))
        .collect();
    assert_eq!(ranked, vec![(a.id, 2), (b.id, 1)]);

    assert_eq!(insights.user_favourites[&u1], vec![a.id, b.id]);
    assert_eq!(insights.user_favourites[&u2], vec![a.id]);
}

#[tokio::test]
async fn test_insights_ties_list_oldest_item_first() {
    let ctx = TestContext::new();
    let older = ctx.create_item("Older", "misc", Vec::new()).await;
    let newer = ctx.create_item("Newer", "misc", Vec::new()).await;
    let u1 = user("user_1_u1");

    let favourites = ctx.state.favourites();
    favourites.toggle(newer.id, &u1).await.unwrap();
    favourites.toggle(older.id, &u1).await.unwrap();

    let insights = ctx.state.insights().compute().await.unwrap();
    let ranked: Vec<_> = insights
        .most_favourited_items
        .iter()
        .map(|f| f.item.id)
        .collect();
    assert_eq!(ranked, vec![older.id, newer.id]);
}

#[tokio::test]
async fn test_insights_without_favourites() {
    let ctx = TestContext::new();
    ctx.create_item("Unloved", "misc", Vec::new()).await;

    let insights = ctx.state.insights().compute().await.unwrap();

    assert_eq!(insights.total_favourites, 0);
    assert_eq!(insights.total_unique_users, 0);
    assert!(insights.most_favourited_items.is_empty());
    assert!(insights.user_favourites.is_empty());
}

#[tokio::test]
async fn test_insights_reflect_current_state() {
    let ctx = TestContext::new();
    let item = ctx.create_item("Clock", "decor", Vec::new()).await;
    let u1 = user("user_1_u1");

    ctx.state.favourites().toggle(item.id, &u1).await.unwrap();
    assert_eq!(
        ctx.state.insights().compute().await.unwrap().total_favourites,
        1
    );

    ctx.state.favourites().toggle(item.id, &u1).await.unwrap();
    assert_eq!(
        ctx.state.insights().compute().await.unwrap().total_favourites,
        0
    );
}
