//! Label sets for chart titles, axes, messages and the window's controls.

use crate::charts::AnimationMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Language {
    #[default]
    #[value(name = "fr")]
    French,
    #[value(name = "en")]
    English,
}

/// Text used by every view and by the window. Titles that embed a value are
/// methods.
#[derive(Debug, Clone)]
pub struct Labels {
    pub language: Language,
    pub bars_over_map_title: &'static str,
    pub victims_title: &'static str,
    pub accused_title: &'static str,
    pub rate_title: &'static str,
    pub scatter_title: &'static str,
    pub bar_title: &'static str,
    pub line_title: &'static str,
    pub region_axis: &'static str,
    pub facts_axis: &'static str,
    pub population: &'static str,
    pub longitude: &'static str,
    pub latitude: &'static str,
    pub year_prefix: &'static str,
    pub no_data: &'static str,
    pub no_data_region_year: &'static str,
    pub missing_file: &'static str,

    // Window
    pub page_biography: &'static str,
    pub page_visualisation: &'static str,
    pub view_pie: &'static str,
    pub view_choropleth: &'static str,
    pub view_bars_over_map: &'static str,
    pub view_victim_accused: &'static str,
    pub view_rate_map: &'static str,
    pub view_animated: &'static str,
    pub view_region_detail: &'static str,
    pub view_table: &'static str,
    pub mode_scatter: &'static str,
    pub mode_bar: &'static str,
    pub mode_line: &'static str,
    pub data_source: &'static str,
    pub view_section: &'static str,
    pub selection_section: &'static str,
    pub category: &'static str,
    pub region: &'static str,
    pub year: &'static str,
    pub column: &'static str,
    pub value: &'static str,
    pub display_columns: &'static str,
    pub select_all: &'static str,
    pub clear_all: &'static str,
    pub browse: &'static str,
    pub no_file: &'static str,
    pub csv_files: &'static str,
    pub geojson_files: &'static str,
    pub ready: &'static str,
    pub nothing_rendered: &'static str,
}

impl Labels {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::French => Self::french(),
            Language::English => Self::english(),
        }
    }

    pub fn french() -> Self {
        Self {
            language: Language::French,
            bars_over_map_title:
                "Répartition des faits par région avec barres 3D distinctes et fond de carte",
            victims_title: "Faits subis par les victimes",
            accused_title: "Faits réalisés par les mis en cause",
            rate_title: "Taux de criminalité par région (faits pour 100 habitants)",
            scatter_title: "Évolution du nombre de faits par région",
            bar_title: "Évolution des faits par région",
            line_title: "Visualisation dynamique des faits par région",
            region_axis: "Code de région",
            facts_axis: "Nombre de faits",
            population: "Population",
            longitude: "Longitude",
            latitude: "Latitude",
            year_prefix: "Année : ",
            no_data: "Pas de données pour cette sélection.",
            no_data_region_year: "Pas de données pour cette région et cette année.",
            missing_file:
                "Le fichier de données est introuvable. Veuillez fournir un fichier CSV valide.",

            page_biography: "Biographie",
            page_visualisation: "Visualisation",
            view_pie: "Camembert par classe",
            view_choropleth: "Carte par région",
            view_bars_over_map: "Barres 3D sur la carte",
            view_victim_accused: "Victimes / mis en cause",
            view_rate_map: "Taux de criminalité",
            view_animated: "Évolution annuelle",
            view_region_detail: "Détail région / année",
            view_table: "Tableau filtré",
            mode_scatter: "Nuage",
            mode_bar: "Barres",
            mode_line: "Lignes",
            data_source: "📁 Sources de données",
            view_section: "📊 Vue",
            selection_section: "🔧 Sélection",
            category: "Classe :",
            region: "Région :",
            year: "Année :",
            column: "Colonne :",
            value: "Valeur :",
            display_columns: "Colonnes affichées :",
            select_all: "Tout cocher",
            clear_all: "Tout décocher",
            browse: "📂 Parcourir",
            no_file: "Aucun fichier sélectionné",
            csv_files: "Fichiers CSV",
            geojson_files: "Fichiers GeoJSON",
            ready: "Prêt",
            nothing_rendered: "Aucune vue",
        }
    }

    pub fn english() -> Self {
        Self {
            language: Language::English,
            bars_over_map_title: "Facts per region as distinct 3D bars over the region map",
            victims_title: "Facts suffered by victims",
            accused_title: "Facts committed by accused persons",
            rate_title: "Crime rate per region (facts per 100 inhabitants)",
            scatter_title: "Number of facts per region over time",
            bar_title: "Facts per region over time",
            line_title: "Dynamic view of facts per region",
            region_axis: "Region code",
            facts_axis: "Number of facts",
            population: "Population",
            longitude: "Longitude",
            latitude: "Latitude",
            year_prefix: "Year: ",
            no_data: "No data for this selection.",
            no_data_region_year: "No data for this region and year.",
            missing_file: "The data file was not found. Please upload a valid CSV file.",

            page_biography: "Biography",
            page_visualisation: "Visualisation",
            view_pie: "Pie by class",
            view_choropleth: "Region map",
            view_bars_over_map: "3D bars over map",
            view_victim_accused: "Victims / accused",
            view_rate_map: "Crime rate",
            view_animated: "Yearly evolution",
            view_region_detail: "Region / year detail",
            view_table: "Filtered table",
            mode_scatter: "Scatter",
            mode_bar: "Bar",
            mode_line: "Line",
            data_source: "📁 Data Source",
            view_section: "📊 View",
            selection_section: "🔧 Selection",
            category: "Category:",
            region: "Region:",
            year: "Year:",
            column: "Column:",
            value: "Value:",
            display_columns: "Display columns:",
            select_all: "Select All",
            clear_all: "Clear All",
            browse: "📂 Browse",
            no_file: "No file selected",
            csv_files: "CSV Files",
            geojson_files: "GeoJSON Files",
            ready: "Ready",
            nothing_rendered: "No Data",
        }
    }

    pub fn category_title(&self, category: &str) -> String {
        match self.language {
            Language::French => format!("Répartition des faits pour la classe '{category}'"),
            Language::English => format!("Distribution of facts for class '{category}'"),
        }
    }

    pub fn detail_title(&self, year: i32, region: &str) -> String {
        match self.language {
            Language::French => {
                format!("Faits et population pour l'année {year} et la région {region}")
            }
            Language::English => {
                format!("Facts and population for year {year} and region {region}")
            }
        }
    }

    pub fn table_title(&self, value: &str) -> String {
        match self.language {
            Language::French => format!("Voici quelques lignes aléatoires pour '{value}'"),
            Language::English => format!("Here are some random rows for '{value}'"),
        }
    }

    pub fn no_data_table(&self, value: &str, column: &str) -> String {
        match self.language {
            Language::French => format!("Pas de données pour {value} dans la colonne {column}."),
            Language::English => format!("No data available for {value} in column {column}."),
        }
    }

    pub fn loaded_status(&self, rows: usize, regions: usize) -> String {
        match self.language {
            Language::French => format!("{rows} lignes et {regions} régions chargées"),
            Language::English => format!("Loaded {rows} rows, {regions} regions"),
        }
    }

    pub fn mode_name(&self, mode: AnimationMode) -> &'static str {
        match mode {
            AnimationMode::Scatter => self.mode_scatter,
            AnimationMode::Bar => self.mode_bar,
            AnimationMode::Line => self.mode_line,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::french()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_embed_their_values() {
        let labels = Labels::english();
        assert_eq!(
            labels.no_data_table("theft", "classe"),
            "No data available for theft in column classe."
        );
        assert_eq!(
            labels.detail_title(2021, "11"),
            "Facts and population for year 2021 and region 11"
        );
        assert_eq!(labels.loaded_status(7, 3), "Loaded 7 rows, 3 regions");
    }

    #[test]
    fn french_is_default() {
        assert_eq!(Labels::default().language, Language::French);
        assert_eq!(
            Labels::for_language(Language::French).category_title("vols"),
            "Répartition des faits pour la classe 'vols'"
        );
        assert_eq!(
            Labels::for_language(Language::French).no_data_table("vols", "classe"),
            "Pas de données pour vols dans la colonne classe."
        );
    }

    #[test]
    fn window_text_follows_language() {
        let fr = Labels::french();
        let en = Labels::english();
        assert_eq!(fr.page_biography, "Biographie");
        assert_eq!(en.page_biography, "Biography");
        assert_eq!(fr.mode_name(AnimationMode::Bar), "Barres");
        assert_eq!(en.mode_name(AnimationMode::Line), "Line");
        assert_ne!(fr.select_all, en.select_all);
    }
}
