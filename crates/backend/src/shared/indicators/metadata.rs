use contracts::enums::user_role::ViewKind;
use contracts::shared::indicators::*;

use super::registry;

fn label(key: MetricKey) -> (&'static str, &'static str) {
    match key {
        MetricKey::LeadsCreated => ("Clientes", "Leads cadastrados no período"),
        MetricKey::AppointmentsBooked => ("Agendamentos", "Visitas agendadas no período"),
        MetricKey::VisitsCompleted => ("Visitas", "Agendamentos com status realizado"),
        MetricKey::SalesClosed => ("Vendas", "Vendas fechadas no período"),
        MetricKey::SalesVolume => ("VGV", "Soma do valor das vendas fechadas"),
        MetricKey::AppointmentsToLeads => ("Clientes → Agendamentos", "Agendamentos / Clientes"),
        MetricKey::VisitsToAppointments => ("Agendamentos → Visitas", "Visitas / Agendamentos"),
        MetricKey::SalesToVisits => ("Visitas → Vendas", "Vendas / Visitas"),
    }
}

/// Build the full catalogue of metrics + views.
pub fn build_catalog() -> IndicatorCatalogResponse {
    let metrics = MetricKey::all()
        .into_iter()
        .map(|key| {
            let (title, description) = label(key);
            MetricMeta {
                key,
                label: title.into(),
                unit: key.unit().into(),
                format: key.format(),
                description: Some(description.into()),
            }
        })
        .collect();

    let views = ViewKind::all()
        .into_iter()
        .map(|view| {
            let profile = registry::profile(view);
            ViewMeta {
                view,
                label: view.display_name().into(),
                metrics: profile.metrics.to_vec(),
                baseline: profile.baseline,
            }
        })
        .collect();

    IndicatorCatalogResponse { metrics, views }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_all_metrics_and_views() {
        let catalog = build_catalog();
        assert_eq!(catalog.metrics.len(), MetricKey::all().len());
        assert_eq!(catalog.views.len(), ViewKind::all().len());
        let broker = catalog
            .views
            .iter()
            .find(|v| v.view == ViewKind::Broker)
            .unwrap();
        assert!(broker.metrics.contains(&MetricKey::SalesToVisits));
        assert_eq!(broker.baseline, BaselineStrategy::TeamAverage);
    }
}
