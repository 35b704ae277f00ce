use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CalculatorInfo {
    pub href: &'static str,
    pub name: &'static str,
    pub nav_label: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

impl CalculatorInfo {
    /// Registry key: the last path segment of `href`.
    pub fn key(&self) -> &'static str {
        self.href.rsplit('/').next().unwrap_or(self.href)
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    pub calculators: &'static [CalculatorInfo],
}

pub static CATEGORIES: &[Category] = &[
    Category {
        id: "time",
        label: "Time & Countdown",
        calculators: &[
            CalculatorInfo {
                href: "/calculators/days-from-date",
                name: "Days From (or Until) a Date",
                nav_label: "Days From Date",
                description: "Find how many days are between any two dates—or from today.",
                keywords: &["days between", "day counter", "date difference", "countdown", "days until"],
            },
            CalculatorInfo {
                href: "/calculators/age-calculator",
                name: "Age Calculator",
                nav_label: "Age",
                description: "Enter a birthdate to see your age in years, months, and days.",
                keywords: &["how old", "birth date", "age in days", "birthday", "age finder"],
            },
            CalculatorInfo {
                href: "/calculators/days-until-birthday",
                name: "Days Until Your Birthday",
                nav_label: "Birthday",
                description: "Countdown with leap-year handling for Feb 29 birthdays.",
                keywords: &["birthday countdown", "birthday timer", "days until birthday", "next birthday"],
            },
            CalculatorInfo {
                href: "/calculators/anniversary-countdown",
                name: "Anniversary Countdown",
                nav_label: "Anniversary",
                description: "Preview the next few anniversaries for any meaningful date.",
                keywords: &["days until anniversary", "relationship milestone", "marriage countdown", "anniversary date"],
            },
            CalculatorInfo {
                href: "/calculators/holiday-countdown",
                name: "Holiday Countdown (US)",
                nav_label: "Holidays",
                description: "See days remaining until major U.S. holidays.",
                keywords: &["christmas countdown", "holiday timer", "days until holiday", "us holidays", "thanksgiving countdown"],
            },
            CalculatorInfo {
                href: "/calculators/flight-time-calculator",
                name: "Flight Time Calculator",
                nav_label: "Flight Time",
                description: "Estimate nonstop duration, arrival time, and time zone shifts between major airports.",
                keywords: &["flight duration", "travel time", "airport finder", "airline route", "flight distance"],
            },
        ],
    },
    Category {
        id: "money",
        label: "Money & Planning",
        calculators: &[
            CalculatorInfo {
                href: "/calculators/paycheck-tax-calculator",
                name: "Paycheck Tax Calculator",
                nav_label: "Paycheck",
                description: "Estimate take-home pay by state with federal, payroll, and state taxes.",
                keywords: &["take home pay", "paycheck after tax", "net pay", "salary calculator", "pay stub"],
            },
            CalculatorInfo {
                href: "/calculators/overtime-pay-calculator",
                name: "Overtime Pay Calculator",
                nav_label: "Overtime",
                description: "See total pay when overtime and double-time hours stack onto your shift.",
                keywords: &["time and a half", "double time", "overtime wages", "extra hours"],
            },
            CalculatorInfo {
                href: "/calculators/freelancer-hourly-rate-calculator",
                name: "Freelancer Hourly Rate",
                nav_label: "Freelance",
                description: "Back into a sustainable freelance rate using income goals and billable hours.",
                keywords: &["freelance pricing", "contract rate", "billable hours", "hourly quote"],
            },
            CalculatorInfo {
                href: "/calculators/salary-to-hourly",
                name: "Salary ↔ Hourly",
                nav_label: "Salary",
                description: "Convert yearly pay to hourly wages (and vice versa) with your schedule.",
                keywords: &["salary to hourly", "hourly to salary", "pay converter", "annual pay"],
            },
            CalculatorInfo {
                href: "/calculators/loan-calculator",
                name: "Loan Calculator",
                nav_label: "Loan",
                description: "Estimate payments and see principal versus interest by year.",
                keywords: &["monthly payment", "loan payment", "amortization", "interest calculator"],
            },
            CalculatorInfo {
                href: "/calculators/car-loan-affordability-calculator",
                name: "Car Loan Affordability",
                nav_label: "Car Budget",
                description: "Find the maximum vehicle price your income can comfortably support.",
                keywords: &["car budget", "car payment", "auto loan", "how much car"],
            },
            CalculatorInfo {
                href: "/calculators/mortgage-calculator",
                name: "Mortgage Planner",
                nav_label: "Mortgage",
                description: "Check affordability, monthly costs, and an amortization schedule.",
                keywords: &["mortgage payment", "home loan", "principal and interest", "mortgage estimate"],
            },
            CalculatorInfo {
                href: "/calculators/debt-payoff-calculator",
                name: "Debt Payoff Calculator",
                nav_label: "Debt",
                description: "Compare snowball and avalanche payoff timelines across all your debts.",
                keywords: &["debt snowball", "debt avalanche", "pay off debt", "debt planner"],
            },
            CalculatorInfo {
                href: "/calculators/credit-card-interest-calculator",
                name: "Credit Card Interest",
                nav_label: "Card Interest",
                description: "Project interest charges while carrying a balance and test extra payments.",
                keywords: &["credit card apr", "interest charges", "carry balance", "credit payoff"],
            },
            CalculatorInfo {
                href: "/calculators/compound-interest-calculator",
                name: "Compound Interest",
                nav_label: "Invest",
                description: "Model investment growth with recurring deposits and raises.",
                keywords: &["investment growth", "interest growth", "future value", "savings calculator"],
            },
            CalculatorInfo {
                href: "/calculators/savings-goal-calculator",
                name: "Savings Goal",
                nav_label: "Savings",
                description: "See the monthly deposit needed to reach a target with growth.",
                keywords: &["monthly savings", "target savings", "goal planner", "savings plan"],
            },
            CalculatorInfo {
                href: "/calculators/savings-vs-investing-comparison",
                name: "Savings vs Investing",
                nav_label: "Save vs Invest",
                description: "Compare bank interest against market returns using the same contributions.",
                keywords: &["investing vs saving", "bank vs market", "compare returns", "investment comparison"],
            },
            CalculatorInfo {
                href: "/calculators/currency-converter",
                name: "Currency Converter",
                nav_label: "Currency",
                description: "Convert between 30+ currencies with live-rate fallback support.",
                keywords: &["exchange rate", "forex", "currency exchange", "convert money"],
            },
            CalculatorInfo {
                href: "/calculators/inflation-calculator",
                name: "Inflation Adjuster",
                nav_label: "Inflation",
                description: "Compare the buying power of money across different years.",
                keywords: &["cpi", "cost of living", "inflation rate", "value of money"],
            },
            CalculatorInfo {
                href: "/calculators/tip-calculator",
                name: "Tip Splitter",
                nav_label: "Tip",
                description: "Quickly find tip amounts and per-person totals for the table.",
                keywords: &["split bill", "restaurant tip", "gratuity", "tip amount"],
            },
            CalculatorInfo {
                href: "/calculators/event-budget-calculator",
                name: "Event Budget Planner",
                nav_label: "Event Budget",
                description: "Forecast venue, catering, staffing, and contingency costs with per-guest totals for any event.",
                keywords: &["wedding budget", "party budget", "event planning", "cost per guest"],
            },
        ],
    },
    Category {
        id: "conversions",
        label: "Converters & Units",
        calculators: &[
            CalculatorInfo {
                href: "/calculators/unit-converter",
                name: "Unit Converter",
                nav_label: "Units",
                description: "Switch between length, weight, temperature, and volume measurements with precise factors.",
                keywords: &["measurement converter", "unit conversion", "metric to imperial", "length weight temperature"],
            },
            CalculatorInfo {
                href: "/calculators/time-zone-converter",
                name: "Time Zone Converter",
                nav_label: "Time Zones",
                description: "Enter a city and instantly compare the time across world capitals—DST aware.",
                keywords: &["world clock", "time difference", "timezone", "city time"],
            },
            CalculatorInfo {
                href: "/calculators/cooking-measurement-converter",
                name: "Cooking Measurement Converter",
                nav_label: "Cooking",
                description: "Translate cups, grams, ounces, and spoons with a water-based kitchen reference.",
                keywords: &["baking conversion", "cooking measurements", "cups to grams", "kitchen converter"],
            },
            CalculatorInfo {
                href: "/calculators/fuel-economy-converter",
                name: "Fuel Economy Converter",
                nav_label: "Fuel",
                description: "Swap between MPG and liters per 100 km when comparing vehicle efficiency.",
                keywords: &["mpg to l/100km", "gas mileage", "fuel efficiency", "km per liter"],
            },
            CalculatorInfo {
                href: "/calculators/speed-converter",
                name: "Speed Converter",
                nav_label: "Speed",
                description: "Convert driving speeds between miles per hour and kilometers per hour.",
                keywords: &["mph to kph", "speed conversion", "kilometers per hour", "miles per hour"],
            },
            CalculatorInfo {
                href: "/calculators/shoe-size-converter",
                name: "Shoe Size Converter",
                nav_label: "Shoes",
                description: "Match US, UK, and EU shoe sizes for men's and women's charts side by side.",
                keywords: &["us to eu shoes", "shoe size chart", "uk shoe size", "foot size"],
            },
            CalculatorInfo {
                href: "/calculators/clothing-size-converter",
                name: "Clothing Size Converter",
                nav_label: "Clothing",
                description: "Find approximate international equivalents for common men's and women's apparel sizes.",
                keywords: &["size chart", "us to eu clothing", "international sizes", "clothing conversion"],
            },
            CalculatorInfo {
                href: "/calculators/pet-age-converter",
                name: "Pet Age Converter",
                nav_label: "Pet Age",
                description: "Translate cat and dog ages into human years (and back) with growth-stage context.",
                keywords: &["dog years", "cat years", "pet age chart", "human years"],
            },
        ],
    },
    Category {
        id: "health",
        label: "Health & Fitness",
        calculators: &[
            CalculatorInfo {
                href: "/calculators/bmi-calculator",
                name: "BMI Calculator",
                nav_label: "BMI",
                description: "Check your body mass index and see a healthy weight range for your height.",
                keywords: &["body mass index", "weight range", "bmi chart", "healthy weight"],
            },
            CalculatorInfo {
                href: "/calculators/bmr-calorie-calculator",
                name: "BMR & Calorie Needs",
                nav_label: "Calories",
                description: "Estimate daily calories for maintenance, weight loss, or muscle gain using the Mifflin-St Jeor equation.",
                keywords: &["calorie calculator", "maintenance calories", "bmr", "metabolism"],
            },
            CalculatorInfo {
                href: "/calculators/body-fat-estimator",
                name: "Body Fat % Estimator",
                nav_label: "Body Fat",
                description: "Approximate body fat percentage and lean mass from tape measurements using the U.S. Navy method.",
                keywords: &["body fat percentage", "navy method", "tape measurements", "body composition"],
            },
            CalculatorInfo {
                href: "/calculators/water-intake-calculator",
                name: "Water Intake Guide",
                nav_label: "Hydration",
                description: "Find a daily water target based on body weight, activity, and climate.",
                keywords: &["daily water", "hydration calculator", "water per day", "drink water"],
            },
            CalculatorInfo {
                href: "/calculators/macros-calculator",
                name: "Macros Calculator",
                nav_label: "Macros",
                description: "Split your calorie goal into daily protein, carb, and fat targets for different training goals.",
                keywords: &["macro split", "protein carbs fat", "nutrition goals", "macro calculator"],
            },
        ],
    },
    Category {
        id: "tools",
        label: "Everyday Tools",
        calculators: &[
            CalculatorInfo {
                href: "/calculators/password-generator",
                name: "Password Generator",
                nav_label: "Password",
                description: "Build strong random passwords with custom character sets and length.",
                keywords: &["random password", "secure password", "password maker", "strong password"],
            },
            CalculatorInfo {
                href: "/calculators/text-case-converter",
                name: "Text Case Converter",
                nav_label: "Text Case",
                description: "Flip text to upper, lower, or title case without losing your formatting.",
                keywords: &["uppercase", "lowercase", "title case", "capitalize text"],
            },
            CalculatorInfo {
                href: "/calculators/hex-rgb-color-converter",
                name: "Hex ↔ RGB Color Converter",
                nav_label: "Color",
                description: "Translate design colors between hexadecimal and RGB with a live swatch preview.",
                keywords: &["hex to rgb", "color picker", "color converter", "rgb to hex"],
            },
            CalculatorInfo {
                href: "/calculators/qr-code-generator",
                name: "QR Code Generator",
                nav_label: "QR Code",
                description: "Turn any text or link into a downloadable QR code with adjustable size.",
                keywords: &["make qr code", "qr creator", "qr download", "generate qr"],
            },
            CalculatorInfo {
                href: "/calculators/word-counter",
                name: "Word & Character Counter",
                nav_label: "Word Counter",
                description: "Track words, characters, sentences, and reading time while you draft or edit text.",
                keywords: &["word count", "character count", "writing stats", "reading time"],
            },
            CalculatorInfo {
                href: "/calculators/pdf-to-word",
                name: "PDF to Word/Text Extractor",
                nav_label: "PDF Extractor",
                description: "Extract plain text from PDFs in your browser and download it as a Word or TXT file.",
                keywords: &["pdf text", "pdf to doc", "extract pdf", "pdf converter"],
            },
            CalculatorInfo {
                href: "/calculators/grade-calculator",
                name: "Grade Goal Calculator",
                nav_label: "Grade Goal",
                description: "See the GPA needed in remaining credits or the final exam score required to reach your target.",
                keywords: &["final grade", "gpa goal", "exam score", "grade needed"],
            },
            CalculatorInfo {
                href: "/calculators/meal-planner",
                name: "Meal Planner & Portion Calculator",
                nav_label: "Meal Planner",
                description: "Scale proteins, sides, desserts, and drinks for any gathering based on adults, kids, and leftovers.",
                keywords: &["meal planning", "portion calculator", "party food", "serving sizes"],
            },
            CalculatorInfo {
                href: "/calculators/typing-speed-test",
                name: "Typing Speed Test",
                nav_label: "Typing Test",
                description: "Score a timed typing run for net words per minute and accuracy.",
                keywords: &["wpm", "typing test", "typing speed", "accuracy"],
            },
        ],
    },
];

pub fn categories() -> &'static [Category] {
    CATEGORIES
}

pub fn all() -> impl Iterator<Item = (&'static Category, &'static CalculatorInfo)> {
    CATEGORIES
        .iter()
        .flat_map(|cat| cat.calculators.iter().map(move |info| (cat, info)))
}

pub fn find(key: &str) -> Option<&'static CalculatorInfo> {
    let key = key.trim_start_matches("/calculators/");
    all().map(|(_, info)| info).find(|info| info.key() == key)
}

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|cat| cat.id == id)
}

/// Case-insensitive match across name, nav label, description and keywords.
pub fn search(query: &str) -> Vec<&'static CalculatorInfo> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    all()
        .map(|(_, info)| info)
        .filter(|info| {
            info.name.to_lowercase().contains(&needle)
                || info.nav_label.to_lowercase().contains(&needle)
                || info.description.to_lowercase().contains(&needle)
                || info.keywords.iter().any(|k| k.to_lowercase().contains(&needle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let keys: Vec<_> = all().map(|(_, info)| info.key()).collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
    }

    #[test]
    fn test_five_categories() {
        let ids: Vec<_> = categories().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["time", "money", "conversions", "health", "tools"]);
    }

    #[test]
    fn test_find_accepts_href() {
        assert_eq!(find("loan-calculator").map(|i| i.nav_label), Some("Loan"));
        assert_eq!(find("/calculators/bmi-calculator").map(|i| i.name), Some("BMI Calculator"));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_search_by_keyword() {
        let hits: Vec<_> = search("GPA").iter().map(|i| i.key()).collect();
        assert!(hits.contains(&"grade-calculator"));
        assert!(search("   ").is_empty());
    }
}
