use stress_test::{stress_test_churn, stress_test_hot_signal, stress_test_mixed, stress_test_scaling};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};


fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let rt = tokio::runtime::Runtime::new().expect("failed to start tokio runtime");
    rt.block_on(async_main());
}

async fn async_main() {
    info!("Started");

    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║            SIGNAL STORE STRESS TESTS                       ║");
    println!("╚════════════════════════════════════════════════════════════╝");

    // Test 1: 100 tasks, one write each
    let stats = stress_test_hot_signal(100, 1).await;
    stats.print();

    // Test 2: Hot signal with sustained contention
    let stats = stress_test_hot_signal(16, 2_000).await;
    stats.print();

    // Test 3: Mixed workload, small scale
    let stats = stress_test_mixed(16, 4, 2_000).await;
    stats.print();

    // Test 4: Mixed workload, medium scale
    let stats = stress_test_mixed(256, 16, 10_000).await;
    stats.print();

    // Test 5: Create/delete churn
    let stats = stress_test_churn(8, 1_000).await;
    stats.print();

    // Test 6: Scaling analysis
    println!("\n\n╔════════════════════════════════════════════════════════════╗");
    println!("║          SCALING ANALYSIS (Hot Signal)                     ║");
    println!("╚════════════════════════════════════════════════════════════╝");
    stress_test_scaling(32, 8).await;

    println!("\n✓ All stress tests completed successfully!");
}
