use anyhow::Result;
use investfolio::models::{Id, Portfolio, Watchlist};
use investfolio::storage::{JsonFileStorage, Storage};
use tempfile::TempDir;

#[tokio::test]
async fn list_portfolios_skips_invalid_json() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let user = Id::from_string("alice");

    let good = Portfolio::new(user.clone(), "Retirement", None)?;
    storage.save_portfolio(&good).await?;

    let bad_dir = dir.path().join("portfolios").join("bad-portfolio");
    std::fs::create_dir_all(&bad_dir)?;
    std::fs::write(bad_dir.join("portfolio.json"), "{not valid json")?;

    let portfolios = storage.list_portfolios(&user).await?;
    assert_eq!(portfolios.len(), 1);
    assert_eq!(portfolios[0].id, good.id);

    Ok(())
}

#[tokio::test]
async fn list_watchlists_skips_invalid_json_and_other_users() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let alice = Id::from_string("alice");

    let mine = Watchlist::new(alice.clone(), "Tech")?;
    storage.save_watchlist(&mine).await?;
    storage
        .save_watchlist(&Watchlist::new(Id::from_string("bob"), "Energy")?)
        .await?;

    let bad_dir = dir.path().join("watchlists").join("broken");
    std::fs::create_dir_all(&bad_dir)?;
    std::fs::write(bad_dir.join("watchlist.json"), "[]")?;

    let lists = storage.list_watchlists(&alice).await?;
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Tech");

    Ok(())
}

#[tokio::test]
async fn storage_rejects_path_traversal_ids() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());

    let bad_id = Id::from_string("../escape");

    let err = storage.get_portfolio(&bad_id).await.unwrap_err();
    assert!(err.to_string().contains("unsafe id"));

    let err = storage.list_notifications(&bad_id).await.unwrap_err();
    assert!(err.to_string().contains("unsafe id"));

    Ok(())
}
