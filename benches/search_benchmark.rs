use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parking_search::{
    filter_and_sort, FacilityRecord, FeedCache, FeedConfig, FeedError, FeedKind, FeedSource,
    QueryEngine, SortKey,
};
use rand::{seq::SliceRandom, thread_rng, Rng};
use std::sync::Arc;

// Serves pre-rendered documents without touching the network
struct StaticFeedSource {
    lots_xml: String,
    meta_xml: String,
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self, kind: FeedKind) -> Result<String, FeedError> {
        Ok(match kind {
            FeedKind::Lots => self.lots_xml.clone(),
            FeedKind::Meta => self.meta_xml.clone(),
        })
    }
}

const DISTRICTS: [&str; 4] = ["DownTown", "Harbour", "Airport", "University"];

fn random_count(rng: &mut impl Rng) -> String {
    // Roughly one in ten counts is a placeholder
    if rng.gen_bool(0.1) {
        "N/A".to_string()
    } else {
        rng.gen_range(0..500).to_string()
    }
}

fn synthetic_records(count: usize) -> Vec<FacilityRecord> {
    let mut rng = thread_rng();
    let mut records: Vec<FacilityRecord> = (0..count)
        .map(|i| FacilityRecord {
            id: i.to_string(),
            name_local: format!("Car Park {}", i),
            car_spaces: random_count(&mut rng),
            motorbike_spaces: random_count(&mut rng),
            in_maintenance: if rng.gen_bool(0.05) { "1" } else { "0" }.to_string(),
            district_local: DISTRICTS.choose(&mut rng).unwrap().to_string(),
            ..FacilityRecord::default()
        })
        .collect();
    records.shuffle(&mut rng);
    records
}

fn synthetic_feeds(count: usize) -> StaticFeedSource {
    let mut rng = thread_rng();
    let mut lots_xml = String::from("<CarPark>");
    let mut meta_xml = String::from("<CarPark>");
    for i in 0..count {
        lots_xml.push_str(&format!(
            r#"<Car_park_info ID="{}" name="Car Park {}" Car_CNT="{}" MB_CNT="{}" maintenance="0" time="2024-03-01 10:00:00"/>"#,
            i,
            i,
            random_count(&mut rng),
            random_count(&mut rng)
        ));
        meta_xml.push_str(&format!(
            r#"<Car_park_info ID="{}" district="{}"/>"#,
            i,
            DISTRICTS.choose(&mut rng).unwrap()
        ));
    }
    lots_xml.push_str("</CarPark>");
    meta_xml.push_str("</CarPark>");

    StaticFeedSource { lots_xml, meta_xml }
}

fn config(lots_ttl_ms: u64) -> FeedConfig {
    FeedConfig {
        api_key: "bench".to_string(),
        api_lots_url: "http://localhost/lots".to_string(),
        api_meta_url: Some("http://localhost/meta".to_string()),
        cache_lots_lifetime_ms: lots_ttl_ms,
        ..FeedConfig::default()
    }
}

pub fn filter_sort_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter_and_sort");
    let records = synthetic_records(2_000);

    for sort_key in [SortKey::NameAsc, SortKey::CarDesc, SortKey::MotorbikeAsc] {
        group.bench_with_input(
            BenchmarkId::from_parameter(sort_key),
            &sort_key,
            |b, &sort_key| b.iter(|| black_box(filter_and_sort(&records, "Park 1", sort_key))),
        );
    }

    group.finish();
}

pub fn search_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [100, 1_000] {
        // Warm cache: every iteration is served from memory
        let warm = QueryEngine::new(Arc::new(FeedCache::new(&config(3_600_000), synthetic_feeds(size))));
        group.bench_with_input(BenchmarkId::new("cached", size), &size, |b, _| {
            b.iter(|| black_box(tokio_test::block_on(warm.search("", Some("car_asc")))))
        });

        // Zero TTL: every iteration parses and joins both documents again
        let cold = QueryEngine::new(Arc::new(FeedCache::new(&config(0), synthetic_feeds(size))));
        group.bench_with_input(BenchmarkId::new("refetch", size), &size, |b, _| {
            b.iter(|| black_box(tokio_test::block_on(cold.search("Harbour", Some("name_desc")))))
        });
    }

    group.finish();
}

criterion_group!(benches, filter_sort_benchmark, search_benchmark);
criterion_main!(benches);
