use crate::charts::{Chart, Figures};
use crate::config::Variant;
use crate::models::TabContent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabGroup {
    pub id: &'static str,
    pub title: &'static str,
    pub default_tab: Chart,
    pub placeholder: &'static str,
    pub tabs: Vec<Chart>,
}

impl TabGroup {
    pub fn cases() -> Self {
        Self {
            id: "case-tabs",
            title: "Case Data",
            default_tab: Chart::DailyCases,
            placeholder: "No case tab selected",
            tabs: vec![Chart::DailyCases, Chart::ActiveCases, Chart::TotalCases],
        }
    }

    pub fn deaths() -> Self {
        Self {
            id: "death-tabs",
            title: "Death Data",
            default_tab: Chart::DailyDeaths,
            placeholder: "No death tab selected",
            tabs: vec![Chart::DailyDeaths, Chart::TotalDeaths],
        }
    }

    pub fn for_variant(variant: Variant) -> Vec<Self> {
        match variant {
            Variant::Cases => vec![Self::cases()],
            Variant::CasesAndDeaths => vec![Self::cases(), Self::deaths()],
        }
    }

    pub fn content_id(&self) -> String {
        format!("{}-content", self.id)
    }

    pub fn contains(&self, chart: Chart) -> bool {
        self.tabs.contains(&chart)
    }
}

/// Resolves the selected tab of `group` to its figure. `None`, unknown ids
/// and ids from other groups yield the group's placeholder.
pub fn dispatch<'a>(group: &'a TabGroup, figures: &'a Figures, active_tab: Option<&str>) -> TabContent<'a> {
    active_tab
        .and_then(Chart::from_tab_id)
        .filter(|chart| group.contains(*chart))
        .and_then(|chart| figures.get(chart))
        .map(|figure| TabContent::Chart { figure })
        .unwrap_or(TabContent::Placeholder {
            message: group.placeholder,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::models::Observation;
    use chrono::NaiveDate;

    fn figures_for(groups: &[TabGroup]) -> Figures {
        let series = derive(vec![Observation {
            reported_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            total_cases: Some(1),
            confirmed_positive: Some(1),
            deaths: Some(0),
        }]);
        Figures::build(groups.iter().flat_map(|group| group.tabs.iter().copied()), &series)
    }

    #[test]
    fn daily_cases_resolves_to_its_figure() {
        let group = TabGroup::cases();
        let figures = figures_for(std::slice::from_ref(&group));
        match dispatch(&group, &figures, Some("daily-cases")) {
            TabContent::Chart { figure } => assert_eq!(figure.id, "daily-cases"),
            other => panic!("expected chart, got {other:?}"),
        }
    }

    #[test]
    fn every_tab_in_a_group_resolves() {
        let groups = TabGroup::for_variant(Variant::CasesAndDeaths);
        let figures = figures_for(&groups);
        for group in &groups {
            for chart in &group.tabs {
                assert!(matches!(
                    dispatch(group, &figures, Some(chart.tab_id())),
                    TabContent::Chart { figure } if figure.id == chart.tab_id()
                ));
            }
        }
    }

    #[test]
    fn no_selection_yields_placeholder() {
        let group = TabGroup::cases();
        let figures = figures_for(std::slice::from_ref(&group));
        assert_eq!(
            dispatch(&group, &figures, None),
            TabContent::Placeholder { message: "No case tab selected" }
        );
    }

    #[test]
    fn unknown_tab_yields_placeholder() {
        let group = TabGroup::cases();
        let figures = figures_for(std::slice::from_ref(&group));
        assert_eq!(
            dispatch(&group, &figures, Some("weekly")),
            TabContent::Placeholder { message: "No case tab selected" }
        );
        assert!(matches!(dispatch(&group, &figures, Some("")), TabContent::Placeholder { .. }));
    }

    #[test]
    fn groups_do_not_share_tabs() {
        let groups = TabGroup::for_variant(Variant::CasesAndDeaths);
        let figures = figures_for(&groups);
        assert_eq!(
            dispatch(&groups[1], &figures, Some("daily-cases")),
            TabContent::Placeholder { message: "No death tab selected" }
        );
        assert!(matches!(
            dispatch(&groups[0], &figures, Some("total-deaths")),
            TabContent::Placeholder { .. }
        ));
    }

    #[test]
    fn variant_controls_groups() {
        assert_eq!(TabGroup::for_variant(Variant::Cases).len(), 1);
        let both = TabGroup::for_variant(Variant::CasesAndDeaths);
        assert_eq!(both[1].id, "death-tabs");
        assert_eq!(both[1].default_tab, Chart::DailyDeaths);
        assert_eq!(both[0].content_id(), "case-tabs-content");
    }
}
