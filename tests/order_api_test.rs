// ==========================================
// 订单 API 集成测试
// ==========================================
// 覆盖: 创建/查询/更新/删除 + 管理员门禁
// ==========================================

mod test_helpers;

use test_helpers::create_repo_and_config;
use tiffin_backoffice::api::{
    ApiError, Caller, CreateOrderRequest, OrderApi, UpdateOrderRequest,
};
use tiffin_backoffice::domain::types::{PaymentMode, PaymentStatus};
use tiffin_backoffice::domain::OrderDate;
use tiffin_backoffice::engine::query::{OrderFilter, QueryParams, SortDir, SortKey};
use tiffin_backoffice::logging;
use tiffin_backoffice::repository::OrderRepository;

fn create_request(date: &str, address: &str) -> CreateOrderRequest {
    CreateOrderRequest {
        date: date.to_string(),
        delivery_address: address.to_string(),
        quantity: Some(2),
        unit_price: Some(120.0),
        mode: Some("Home Delivery".to_string()),
        payment_status: None,
        payment_mode: Some("GPay".to_string()),
    }
}

#[tokio::test]
async fn test_create_order_generates_identifier_and_derives_fields() {
    logging::init_test();
    let (_db, repo, config) = create_repo_and_config();
    config.set_default_unit_price(100.0).unwrap();
    let api = OrderApi::new(repo.clone(), config);

    let order = api.create_order(create_request("05/02/2024", "12 MG Road")).await.unwrap();

    // 标识: TF + YYMMDD + 3 位后缀
    assert!(order.order_id.starts_with("TF240205"));
    assert_eq!(order.order_id.len(), 11);
    assert_eq!(order.date.as_valid().unwrap().to_string(), "2024-02-05");
    assert_eq!(order.total_amount, 240.0);
    // 默认状态为待收款
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.payment_mode, Some(PaymentMode::Upi));
    assert_eq!(order.billing_month, Some(2));
    assert_eq!(order.billing_year, Some(2024));
    // 单价 120 ≠ 默认价 100
    assert!(order.price_override);

    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_order_with_unparsable_date_needs_review() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo, config);

    let order = api
        .create_order(create_request("next monday", "12 MG Road"))
        .await
        .unwrap();
    match &order.date {
        OrderDate::NeedsReview(raw) => assert_eq!(raw, "next monday"),
        other => panic!("期望 NeedsReview，实际 {:?}", other),
    }
    // 无有效日期: 标识内嵌当前日期，账期缺失
    assert!(order.order_id.starts_with("TF"));
    assert_eq!(order.billing_month, None);
}

#[tokio::test]
async fn test_create_order_validates_required_fields() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo, config);

    let result = api.create_order(create_request("", "12 MG Road")).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));

    let result = api.create_order(create_request("2024-02-05", "  ")).await;
    assert!(matches!(result, Err(ApiError::InvalidInput(_))));
}

#[tokio::test]
async fn test_create_order_uses_default_price_when_absent() {
    let (_db, repo, config) = create_repo_and_config();
    config.set_default_unit_price(90.0).unwrap();
    let api = OrderApi::new(repo, config);

    let mut request = create_request("2024-02-05", "12 MG Road");
    request.unit_price = None;
    request.quantity = None;
    let order = api.create_order(request).await.unwrap();
    assert_eq!(order.unit_price, 90.0);
    assert_eq!(order.quantity, 1);
    assert_eq!(order.total_amount, 90.0);
    assert!(!order.price_override);
}

#[tokio::test]
async fn test_same_day_orders_get_distinct_identifiers() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo, config);

    let a = api.create_order(create_request("2024-02-05", "A")).await.unwrap();
    let b = api.create_order(create_request("2024-02-05", "B")).await.unwrap();
    assert_ne!(a.order_id, b.order_id);
    assert!(b.order_id.starts_with("TF240205"));
}

#[tokio::test]
async fn test_update_order_recomputes_total_and_rebills() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo, config);

    let order = api.create_order(create_request("2024-02-05", "12 MG Road")).await.unwrap();

    let updated = api
        .update_order(
            &order.order_id,
            UpdateOrderRequest {
                date: Some("2024-03-10".to_string()),
                quantity: Some(5),
                unit_price: Some(80.0),
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // 标识不变；总额重算；账期跟随新日期
    assert_eq!(updated.order_id, order.order_id);
    assert_eq!(updated.total_amount, 400.0);
    assert_eq!(updated.billing_month, Some(3));
    assert_eq!(updated.payment_status, PaymentStatus::Paid);
    assert!(updated.updated_at >= order.updated_at);
}

#[tokio::test]
async fn test_update_missing_order_is_not_found() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo, config);

    let result = api
        .update_order("TF999999XXX", UpdateOrderRequest::default())
        .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_list_orders_filters_and_sorts() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo, config);

    api.create_order(create_request("2024-02-05", "12 MG Road")).await.unwrap();
    api.create_order(create_request("2024-02-07", "4 Park Street")).await.unwrap();
    let mut paid_request = create_request("2024-02-06", "9 Lake View");
    paid_request.payment_status = Some(PaymentStatus::Paid);
    api.create_order(paid_request).await.unwrap();

    // 默认排序: 日期降序
    let page = api.list_orders(&QueryParams::default()).await.unwrap();
    assert_eq!(page.total_count, 3);
    let dates: Vec<String> = page
        .orders
        .iter()
        .map(|o| o.date.as_valid().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2024-02-07", "2024-02-06", "2024-02-05"]);

    // 状态过滤 + 升序
    let params = QueryParams {
        filter: OrderFilter {
            payment_status: Some(PaymentStatus::Pending),
            ..Default::default()
        },
        sort_key: Some(SortKey::Date),
        sort_dir: Some(SortDir::Asc),
        ..Default::default()
    };
    let page = api.list_orders(&params).await.unwrap();
    assert_eq!(page.total_count, 2);
    assert_eq!(
        page.orders[0].date.as_valid().unwrap().to_string(),
        "2024-02-05"
    );

    // 地址检索
    let params = QueryParams {
        filter: OrderFilter {
            search: Some("park".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let page = api.list_orders(&params).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.orders[0].delivery_address, "4 Park Street");
}

#[tokio::test]
async fn test_delete_order() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo.clone(), config);

    let order = api.create_order(create_request("2024-02-05", "12 MG Road")).await.unwrap();
    let deleted = api.delete_order(&order.order_id).await.unwrap();
    assert_eq!(deleted.order_id, order.order_id);
    assert_eq!(repo.count().await.unwrap(), 0);

    // 二次删除: NotFound
    let result = api.delete_order(&order.order_id).await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_all_requires_admin() {
    let (_db, repo, config) = create_repo_and_config();
    let api = OrderApi::new(repo.clone(), config);

    api.create_order(create_request("2024-02-05", "12 MG Road")).await.unwrap();

    let result = api.delete_all_orders(&Caller::operator("ops-1")).await;
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    assert_eq!(repo.count().await.unwrap(), 1);

    let deleted = api.delete_all_orders(&Caller::admin("admin-1")).await.unwrap();
    assert_eq!(deleted, 1);
    assert_eq!(repo.count().await.unwrap(), 0);
}
