use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    imports: AtomicU64,
    imported_records: AtomicU64,
    empty_imports: AtomicU64,
    import_errors: AtomicU64,
    lookups: AtomicU64,
    lookup_failures: AtomicU64,
    remote_syncs: AtomicU64,
    remote_sync_failures: AtomicU64,
    cleaned_dates: AtomicU64,
}

impl Metrics {
    pub fn record_import(&self, record_count: usize) {
        self.imports.fetch_add(1, Ordering::Relaxed);
        self.imported_records
            .fetch_add(record_count as u64, Ordering::Relaxed);
    }

    pub fn record_empty_import(&self) {
        self.empty_imports.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_import_error(&self) {
        self.import_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self, ok: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.lookup_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_remote_sync(&self, ok: bool) {
        if ok {
            self.remote_syncs.fetch_add(1, Ordering::Relaxed);
        } else {
            self.remote_sync_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cleanup(&self, removed_dates: usize) {
        self.cleaned_dates
            .fetch_add(removed_dates as u64, Ordering::Relaxed);
    }

    pub fn render_prometheus(&self) -> String {
        let counters = [
            ("btag_imports_total", &self.imports),
            ("btag_imported_records_total", &self.imported_records),
            ("btag_empty_imports_total", &self.empty_imports),
            ("btag_import_errors_total", &self.import_errors),
            ("btag_profile_lookups_total", &self.lookups),
            ("btag_profile_lookup_failures_total", &self.lookup_failures),
            ("btag_remote_syncs_total", &self.remote_syncs),
            ("btag_remote_sync_failures_total", &self.remote_sync_failures),
            ("btag_cleaned_dates_total", &self.cleaned_dates),
        ];
        let mut out = String::new();
        for (name, counter) in counters {
            out.push_str(&format!(
                "# TYPE {} counter\n{} {}\n",
                name,
                name,
                counter.load(Ordering::Relaxed)
            ));
        }
        out
    }
}
