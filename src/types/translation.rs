//! Screen label tables per language

use serde::Serialize;

use crate::types::{Language, Material};

/// Fixed set of screen labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub welcome: &'static str,
    pub subtitle: &'static str,
    pub scan_card: &'static str,
    pub scan_card_sub: &'static str,
    pub select_material: &'static str,
    pub plastic: &'static str,
    pub paper: &'static str,
    pub insert_items: &'static str,
    pub current_points: &'static str,
    pub count: &'static str,
    pub confirm: &'static str,
    pub processing: &'static str,
    pub success_title: &'static str,
    pub success_message: &'static str,
    pub simulated_sensor: &'static str,
    pub paper_coming_soon: &'static str,
}

const AZE: Translation = Translation {
    welcome: "Xoş Gəlmisiniz",
    subtitle: "Təbiəti qoruyun, gələcəyi qazanın",
    scan_card: "Kartınızı Oxudun",
    scan_card_sub: "Davam etmək üçün kartı terminala yaxınlaşdırın",
    select_material: "Tullantı Növünü Seçin",
    plastic: "Plastik",
    paper: "Kağız",
    insert_items: "Tullantıları Daxil Edin",
    current_points: "Cari Xal",
    count: "Say",
    confirm: "Təsdiq Et",
    processing: "Hesablanır...",
    success_title: "Uğurla Tamamlandı",
    success_message: "Xallar hesabınıza uğurla yükləndi.",
    simulated_sensor: "Simulyasiya: Cihaz",
    paper_coming_soon: "Tezliklə...",
};

const ENG: Translation = Translation {
    welcome: "Welcome",
    subtitle: "Protect nature, earn the future",
    scan_card: "Scan Your Card",
    scan_card_sub: "Tap your card on the reader to continue",
    select_material: "Select Material Type",
    plastic: "Plastic",
    paper: "Paper",
    insert_items: "Insert Items",
    current_points: "Current Points",
    count: "Count",
    confirm: "Confirm",
    processing: "Processing...",
    success_title: "Successfully Completed",
    success_message: "Points have been successfully loaded to your account.",
    simulated_sensor: "Simulation: Sensor",
    paper_coming_soon: "Coming Soon...",
};

const RU: Translation = Translation {
    welcome: "Добро пожаловать",
    subtitle: "Берегите природу, зарабатывайте будущее",
    scan_card: "Сканируйте карту",
    scan_card_sub: "Приложите карту к терминалу для продолжения",
    select_material: "Выберите тип отходов",
    plastic: "Пластик",
    paper: "Бумага",
    insert_items: "Вставьте предметы",
    current_points: "Текущие баллы",
    count: "Количество",
    confirm: "Подтвердить",
    processing: "Обработка...",
    success_title: "Успешно завершено",
    success_message: "Баллы успешно зачислены на ваш счет.",
    simulated_sensor: "Симуляция: Датчик",
    paper_coming_soon: "Скоро...",
};

/// Label table for a language
pub fn texts(language: Language) -> &'static Translation {
    match language {
        Language::Aze => &AZE,
        Language::Eng => &ENG,
        Language::Ru => &RU,
    }
}

impl Translation {
    /// Label for a material button
    pub fn material_label(&self, material: Material) -> &'static str {
        match material {
            Material::Plastic => self.plastic,
            Material::Paper => self.paper,
        }
    }
}
