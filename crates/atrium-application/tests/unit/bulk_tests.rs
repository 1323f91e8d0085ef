//! Tests for bulk get-or-create

use super::support::{Gizmo, Widget, widget_facade};
use atrium_application::SetOptions;
use atrium_domain::Error;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn ids(raw: &[&str]) -> Vec<String> {
    raw.iter().map(ToString::to_string).collect()
}

fn widgets_for(requested: &[String], skip: &[&str]) -> HashMap<String, Widget> {
    requested
        .iter()
        .filter(|id| !skip.contains(&id.as_str()))
        .map(|id| (id.clone(), Widget::new(id.parse().unwrap(), "loaded")))
        .collect()
}

#[tokio::test]
async fn test_bulk_loads_only_missing_ids_once() {
    let (cache, _) = widget_facade();
    cache
        .set("1", &Widget::new(1, "cached"), SetOptions::new())
        .await
        .unwrap();

    let seen = Mutex::new(Vec::new());
    let seen_ref = &seen;
    let result = cache
        .get_or_create_bulk(&ids(&["1", "2", "2", "01", "3"]), move |missing| async move {
            seen_ref.lock().unwrap().push(missing.clone());
            Ok(widgets_for(&missing, &[]))
        })
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![ids(&["2", "3"])]);
    assert_eq!(result.len(), 3);
    assert_eq!(result["1"], Widget::new(1, "cached"));
    assert_eq!(result["2"], Widget::new(2, "loaded"));
    assert!(cache.contains::<Widget>("3").await.unwrap());
}

#[tokio::test]
async fn test_bulk_skips_factory_when_everything_is_cached() {
    let (cache, _) = widget_facade();
    for id in ["1", "2"] {
        cache
            .set(id, &Widget::new(id.parse().unwrap(), "cached"), SetOptions::new())
            .await
            .unwrap();
    }

    let result = cache
        .get_or_create_bulk::<Widget, _, _>(&ids(&["1", "2"]), |_| async {
            Err(Error::internal("factory must not run"))
        })
        .await
        .unwrap();
    assert_eq!(result.len(), 2);
}

#[tokio::test]
async fn test_bulk_omits_ids_the_factory_cannot_find() {
    let (cache, _) = widget_facade();

    let result = cache
        .get_or_create_bulk(&ids(&["1", "2", "3"]), |missing| async move {
            Ok(widgets_for(&missing, &["2"]))
        })
        .await
        .unwrap();

    let mut found: Vec<&str> = result.keys().map(String::as_str).collect();
    found.sort_unstable();
    assert_eq!(found, vec!["1", "3"]);
    assert!(!cache.contains::<Widget>("2").await.unwrap());
}

#[tokio::test]
async fn test_bulk_skips_unconvertible_ids() {
    let (cache, _) = widget_facade();

    let result = cache
        .get_or_create_bulk(&ids(&["1", "one"]), |missing| async move {
            assert_eq!(missing, vec!["1".to_string()]);
            Ok(widgets_for(&missing, &[]))
        })
        .await
        .unwrap();
    assert_eq!(result.len(), 1);
}

#[tokio::test]
async fn test_bulk_ignores_unrequested_results() {
    let (cache, _) = widget_facade();

    let result = cache
        .get_or_create_bulk(&ids(&["1"]), |_| async {
            Ok(HashMap::from([
                ("1".to_string(), Widget::new(1, "wanted")),
                ("99".to_string(), Widget::new(99, "stray")),
            ]))
        })
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert!(!cache.contains::<Widget>("99").await.unwrap());
}

#[tokio::test]
async fn test_bulk_factory_error_releases_keys() {
    let (cache, _) = widget_facade();

    let failed = cache
        .get_or_create_bulk::<Widget, _, _>(&ids(&["1", "2"]), |_| async {
            Err(Error::backing_store("database unavailable"))
        })
        .await;
    assert!(failed.is_err());
    assert!(cache.store().locks().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bulk_waits_for_keys_loading_elsewhere() {
    let (cache, _) = widget_facade();
    let key = cache.key_for("Widget", "5").unwrap().unwrap();
    let lease = cache.store().lease(&key).await;

    let requested = Arc::new(Mutex::new(Vec::new()));
    let bulk = {
        let cache = cache.clone();
        let requested = Arc::clone(&requested);
        tokio::spawn(async move {
            cache
                .get_or_create_bulk(&ids(&["5", "6"]), move |missing| async move {
                    requested.lock().unwrap().extend(missing.iter().cloned());
                    Ok(widgets_for(&missing, &[]))
                })
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    cache
        .set(
            "5",
            &Widget::new(5, "elsewhere"),
            SetOptions::new().ignoring_lock(),
        )
        .await
        .unwrap();
    drop(lease);

    let result = bulk.await.unwrap().unwrap();
    assert_eq!(*requested.lock().unwrap(), ids(&["6"]));
    assert_eq!(result["5"], Widget::new(5, "elsewhere"));
    assert_eq!(result["6"], Widget::new(6, "loaded"));
}

#[tokio::test]
async fn test_bulk_unregistered_type_passes_deduplicated_ids() {
    let (cache, _) = widget_facade();

    let result = cache
        .get_or_create_bulk::<Gizmo, _, _>(&ids(&["1", "1", "2"]), |missing| async move {
            assert_eq!(missing, ids(&["1", "2"]));
            Ok(missing
                .into_iter()
                .map(|id| {
                    let gizmo = Gizmo {
                        id: id.parse().unwrap(),
                    };
                    (id, gizmo)
                })
                .collect())
        })
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert!(!cache.contains::<Gizmo>("1").await.unwrap());
}
