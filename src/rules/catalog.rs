use super::{Needs, Rule};
use crate::format::{self, number, opt_number, opt_signed, ranked, signed, title};
use crate::intent::Intent;
use crate::metrics::{channels, media, organic, overall, sales, Period, SortOrder};
use crate::schema::{Dataset, SchemaError};

type Answer = Result<String, SchemaError>;

const DEFAULT_TOP_N: usize = 5;

const fn rule(
    name: &'static str,
    all: &'static [&'static str],
    any: &'static [&'static str],
    needs: Needs,
    handler: fn(&Intent, &Dataset) -> Answer,
) -> Rule {
    Rule {
        name,
        all,
        any,
        needs,
        handler,
    }
}

const PRODUCT: Needs = Needs {
    product: true,
    ..Needs::NONE
};
const WEEK: Needs = Needs {
    week: true,
    ..Needs::NONE
};
const WEEK_PAIR: Needs = Needs {
    week_pair: true,
    ..Needs::NONE
};
const MONTH: Needs = Needs {
    month: true,
    ..Needs::NONE
};
const TOP_N: Needs = Needs {
    top_n: true,
    ..Needs::NONE
};
const VENDOR: Needs = Needs {
    vendor: true,
    ..Needs::NONE
};

/// Narrow rules sit above the broader rules they would otherwise shadow.
#[rustfmt::skip]
static CATALOG: &[Rule] = &[
    // literal phrasings
    rule("highest_units_sold_week_25", &["highest units sold", "week 25"], &[], Needs::NONE, highest_units_week_25),
    rule("top_5_vendors_july", &["top 5 vendors", "july"], &[], Needs::NONE, top_5_vendors_july),
    // two-week comparisons
    rule("compare_units_sold", &["compare", "units"], &[], WEEK_PAIR, compare_units_sold),
    rule("media_share_change", &["media share"], &["change", "compare", "difference", "shift"], WEEK_PAIR, media_share_change),
    // organic vs media for one product
    rule("channel_total_units", &["organic", "media", "units"], &["total", "combined", "together"], PRODUCT, channel_total_units),
    rule("channel_units", &["organic", "media", "units"], &[], PRODUCT, channel_units),
    rule("channel_share", &["organic", "media", "share"], &[], PRODUCT, channel_share),
    rule("channel_sv_gap", &["organic", "media"], &[" sv", "search volume", "gap"], PRODUCT, channel_sv_gap),
    // organic sheet
    rule("top_cogs_products", &["cogs"], &["top", "highest"], TOP_N, top_cogs_products),
    rule("highest_cogs_product", &["cogs"], &["highest", "most", "top"], Needs::NONE, highest_cogs_product),
    rule("week_highest_organic_share", &["organic share"], &["which week", "what week"], Needs::NONE, week_highest_organic_share),
    rule("lowest_organic_share_product", &["organic share"], &["lowest", "least", "worst"], Needs::NONE, lowest_organic_share_product),
    rule("organic_share_of_sales", &["organic share"], &[], PRODUCT, organic_share_of_sales),
    rule("weekly_ni_organic", &["organic"], &["weekly net income", "weekly ni", "net income by week", "ni by week", "week by week"], PRODUCT, weekly_ni_organic),
    rule("avg_ni_sku_organic", &["organic"], &["ni per sku", "net income per sku", "ni sku"], Needs::NONE, avg_ni_sku_organic),
    rule("avg_daily_osv", &[], &["daily osv", "avg daily organic sv", "average daily organic sv"], Needs::NONE, avg_daily_osv),
    rule("highest_daily_organic_sv", &["organic sv"], &["highest", "top", "most", "best"], Needs::NONE, highest_daily_organic_sv),
    rule("total_organic_sv", &[], &["organic sv", "organic search volume"], Needs::NONE, total_organic_sv),
    // media sheet
    rule("media_ni_by_product", &["media"], &["net income", "ni per sku"], PRODUCT, media_ni_by_product),
    rule("negative_ni_media", &["negative"], &["net income", " ni", "margin"], Needs::NONE, negative_ni_media),
    rule("positive_ni_media", &["positive"], &["net income", " ni", "margin"], Needs::NONE, positive_ni_media),
    rule("avg_ni_per_sku_media", &["media"], &["ni per sku", "net income per sku"], Needs::NONE, avg_ni_per_sku_media),
    rule("top_ni_product_media", &["media", "net income"], &["top", "highest", "best", "most"], Needs::NONE, top_ni_product_media),
    rule("total_ni_media", &["media"], &["total net income", "total ni", "net income"], Needs::NONE, total_ni_media),
    rule("week_highest_daily_msv", &["msv"], &["which week", "what week"], Needs::NONE, week_highest_daily_msv),
    rule("top_media_units", &["media units"], &["top", "best", "highest", "most"], Needs::NONE, top_media_units),
    rule("media_units_by_product", &["media", "units"], &[], PRODUCT, media_units_by_product),
    rule("avg_cpa", &[], &["cpa", "cost per acquisition"], Needs::NONE, avg_cpa),
    // overall and week-over-week change
    rule("lowest_overall_sv_week", &["week", "overall"], &["lowest", "weakest", "worst"], Needs::NONE, lowest_overall_sv_week),
    rule("avg_overall_daily_sv", &["overall"], &["daily sv", "search volume", "overall sv"], Needs::NONE, avg_overall_daily_sv),
    rule("overall_total_units", &["overall"], &["units"], Needs::NONE, overall_total_units),
    rule("week_change_summary", &[], &["week over week", "week-over-week", " wow ", "% change", "percent change"], WEEK, week_change_summary),
    // raw sales
    rule("vendor_units_sold", &["vendor"], &[], VENDOR, vendor_units_sold),
    rule("top_vendors_in_month", &["vendors"], &["top", "best"], MONTH, top_vendors_in_month),
    rule("top_vendor", &["vendor"], &["top", "best", "biggest", "leading", "highest", "most"], Needs::NONE, top_vendor),
    rule("highest_units_sold_product", &[], &["highest units sold", "most units sold"], Needs::NONE, highest_units_sold_product),
    rule("top_n_products", &["product"], &["top", "best"], TOP_N, top_n_products),
    rule("bottom_n_products", &["product"], &["worst", "bottom", "lowest"], TOP_N, bottom_n_products),
    rule("top_product", &["product"], &["top", "best", "most sold"], Needs::NONE, top_product),
    rule("worst_product", &["product"], &["worst", "least", "lowest"], Needs::NONE, worst_product),
    rule("units_by_week", &["units"], &["by week", "per week", "each week", "weekly"], Needs::NONE, units_by_week),
    rule("product_units_sold", &["units"], &[], PRODUCT, product_units_sold),
    rule("total_units_sold", &[], &["units sold", "total units"], Needs::NONE, total_units_sold),
];

pub fn catalog() -> &'static [Rule] {
    CATALOG
}

fn product_of(intent: &Intent) -> &str {
    intent.product.as_deref().unwrap_or_default()
}

fn top_n_of(intent: &Intent) -> usize {
    intent.top_n().unwrap_or(DEFAULT_TOP_N)
}

fn nothing(what: &str, period: Period) -> String {
    format!("ℹ️ No {} {}.", what, format::period(period))
}

fn highest_units_week_25(intent: &Intent, d: &Dataset) -> Answer {
    highest_units_in(d, Period::week(25).with_year(intent.year))
}

fn highest_units_sold_product(intent: &Intent, d: &Dataset) -> Answer {
    highest_units_in(d, intent.period())
}

fn highest_units_in(d: &Dataset, period: Period) -> Answer {
    let sales = d.require_sales()?;
    Ok(match sales::highest_units_sold_product(sales, period) {
        Some((product, units)) => format!(
            "🏆 Highest units sold {}: {} ({} units)",
            format::period(period),
            product,
            units
        ),
        None => nothing("sales recorded", period),
    })
}

fn top_5_vendors_july(intent: &Intent, d: &Dataset) -> Answer {
    vendors_in_month(d, 7, intent.year, 5)
}

fn top_vendors_in_month(intent: &Intent, d: &Dataset) -> Answer {
    vendors_in_month(d, intent.month().unwrap_or_default(), intent.year, top_n_of(intent))
}

fn vendors_in_month(d: &Dataset, month: u32, year: Option<i32>, n: usize) -> Answer {
    let sales = d.require_sales()?;
    let month_name = chrono::Month::try_from(month as u8)
        .map(|m| m.name().to_string())
        .unwrap_or_else(|_| format!("month {}", month));
    let top = sales::top_vendors_in_month(sales, month, year, n);
    if top.is_empty() {
        return Ok(format!("ℹ️ No vendor sales recorded in {}.", month_name));
    }
    Ok(format!(
        "🏅 Top {} vendors in {}:\n{}",
        top.len(),
        month_name,
        ranked(&top, |v| format!("{} units", v))
    ))
}

fn compare_units_sold(intent: &Intent, d: &Dataset) -> Answer {
    let sales = d.require_sales()?;
    let (a, b) = intent.week_pair().unwrap_or_default();
    let (first, second) = sales::compare_units_sold(
        sales,
        Period::week(a).with_year(intent.year),
        Period::week(b).with_year(intent.year),
    );
    Ok(format!(
        "📊 Units sold (all products): week {} = {}, week {} = {} (change {})",
        a,
        first,
        b,
        second,
        signed((second - first) as f64)
    ))
}

fn media_share_change(intent: &Intent, d: &Dataset) -> Answer {
    let change = d.require_change()?;
    let (a, b) = intent.week_pair().unwrap_or_default();
    Ok(
        match overall::change_in_media_share(
            change,
            Period::week(a).with_year(intent.year),
            Period::week(b).with_year(intent.year),
        ) {
            Some(delta) => format!(
                "📈 Media share % changed by {} points from week {} to week {}",
                signed(delta),
                a,
                b
            ),
            None => format!("ℹ️ Media share is not recorded for both week {} and week {}.", a, b),
        },
    )
}

fn channel_total_units(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let total = channels::total_channel_units(d.require_organic()?, d.require_media()?, product, period);
    Ok(format!(
        "📦 {} organic + media units {}: {}",
        title(product),
        format::period(period),
        number(total)
    ))
}

fn channel_units(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let (org, med) = channels::compare_units(d.require_organic()?, d.require_media()?, product, period);
    Ok(format!(
        "📊 {} units {}: organic {} vs media {}",
        title(product),
        format::period(period),
        number(org),
        number(med)
    ))
}

fn channel_share(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let (org, med) = channels::compare_share(d.require_organic()?, d.require_media()?, product, period);
    Ok(format!(
        "📊 {} share {}: organic {}% vs media {}%",
        title(product),
        format::period(period),
        opt_number(org),
        opt_number(med)
    ))
}

fn channel_sv_gap(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let (org, med, gap) = channels::daily_sv_gap(d.require_organic()?, d.require_media()?, product, period);
    Ok(format!(
        "🔍 {} daily SV {}: organic {}, media {}, gap {}",
        title(product),
        format::period(period),
        opt_number(org),
        opt_number(med),
        opt_signed(gap)
    ))
}

fn top_cogs_products(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let top = organic::top_products_by_cogs(d.require_organic()?, period, top_n_of(intent));
    if top.is_empty() {
        return Ok(nothing("COGS recorded", period));
    }
    Ok(format!(
        "💰 Top {} products by COGS {}:\n{}",
        top.len(),
        format::period(period),
        ranked(&top, |v| number(*v))
    ))
}

fn highest_cogs_product(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match organic::highest_cogs_product(d.require_organic()?, period) {
        Some((product, cogs)) => format!(
            "💰 Highest COGS {}: {} ({})",
            format::period(period),
            product,
            number(cogs)
        ),
        None => nothing("COGS recorded", period),
    })
}

fn week_highest_organic_share(intent: &Intent, d: &Dataset) -> Answer {
    let period = Period::new(None, intent.year);
    Ok(match organic::week_with_highest_organic_share(d.require_organic()?, intent.year) {
        Some((week, share)) => format!(
            "🌱 Highest organic share {}: week {} ({}%)",
            format::period(period),
            week,
            number(share)
        ),
        None => nothing("organic share recorded", period),
    })
}

fn lowest_organic_share_product(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match organic::lowest_organic_share_product(d.require_organic()?, period) {
        Some((product, share)) => format!(
            "🌱 Lowest organic share {}: {} ({}%)",
            format::period(period),
            product,
            number(share)
        ),
        None => nothing("organic share recorded", period),
    })
}

fn organic_share_of_sales(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let share = organic::organic_share_of_sales(d.require_organic()?, product, period);
    Ok(format!(
        "🌱 {} organic share {}: {}",
        title(product),
        format::period(period),
        share.map(|s| format!("{}%", number(s))).unwrap_or_else(|| "no data".into())
    ))
}

fn weekly_ni_organic(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let weeks = organic::weekly_ni_organic(d.require_organic()?, product, intent.year);
    if weeks.is_empty() {
        return Ok(nothing(
            &format!("organic net income recorded for {}", title(product)),
            Period::new(None, intent.year),
        ));
    }
    let lines = weeks
        .iter()
        .map(|(week, ni)| format!("Week {}: {}", week, number(*ni)))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!("💵 Weekly organic NI per SKU for {}:\n{}", title(product), lines))
}

fn avg_ni_sku_organic(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let avg = organic::avg_ni_sku_organic(d.require_organic()?, period);
    Ok(format!(
        "💵 Average organic NI per SKU {}: {}",
        format::period(period),
        opt_number(avg)
    ))
}

fn avg_daily_osv(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let avg = overall::avg_daily_osv(d.require_change()?, period);
    Ok(format!(
        "🔍 Average daily organic SV {}: {}",
        format::period(period),
        opt_number(avg)
    ))
}

fn highest_daily_organic_sv(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match organic::highest_daily_organic_sv_product(d.require_organic()?, period) {
        Some((product, sv)) => format!(
            "🔍 Highest daily organic SV {}: {} ({})",
            format::period(period),
            product,
            number(sv)
        ),
        None => nothing("organic SV recorded", period),
    })
}

fn total_organic_sv(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let total = organic::total_organic_sv(d.require_organic()?, period);
    Ok(format!(
        "🔍 Total daily organic SV {}: {}",
        format::period(period),
        number(total)
    ))
}

fn media_ni_by_product(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let avg = media::avg_ni_per_sku_media_by_product(d.require_media()?, product);
    Ok(format!(
        "💵 Average media NI per SKU for {}: {}",
        title(product),
        opt_number(avg)
    ))
}

fn negative_ni_media(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let products = media::negative_ni_products(d.require_media()?, period);
    if products.is_empty() {
        return Ok(nothing("products with negative media NI", period));
    }
    Ok(format!(
        "🔻 Products with negative media NI per SKU {}: {}",
        format::period(period),
        products.join(", ")
    ))
}

fn positive_ni_media(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let products = media::positive_ni_products(d.require_media()?, period);
    if products.is_empty() {
        return Ok(nothing("products with positive media NI", period));
    }
    Ok(format!(
        "🔺 Products with positive media NI per SKU {}: {}",
        format::period(period),
        products.join(", ")
    ))
}

fn avg_ni_per_sku_media(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let avg = media::avg_ni_per_sku_media(d.require_media()?, period);
    Ok(format!(
        "💵 Average media NI per SKU {}: {}",
        format::period(period),
        opt_number(avg)
    ))
}

fn top_ni_product_media(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match media::top_ni_product_media(d.require_media()?, period) {
        Some((product, ni)) => format!(
            "💵 Top media net income {}: {} ({})",
            format::period(period),
            product,
            number(ni)
        ),
        None => nothing("media net income recorded", period),
    })
}

fn total_ni_media(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let total = media::total_ni_media(d.require_media()?, period);
    Ok(format!(
        "💵 Total media net income {}: {}",
        format::period(period),
        number(total)
    ))
}

fn week_highest_daily_msv(intent: &Intent, d: &Dataset) -> Answer {
    let period = Period::new(None, intent.year);
    Ok(match media::week_with_highest_daily_msv(d.require_media()?, intent.year) {
        Some((week, msv)) => format!(
            "📣 Highest daily MSV {}: week {} ({})",
            format::period(period),
            week,
            number(msv)
        ),
        None => nothing("media SV recorded", period),
    })
}

fn top_media_units(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let top = media::top_products_by_media_units(d.require_media()?, period, top_n_of(intent));
    if top.is_empty() {
        return Ok(nothing("media units recorded", period));
    }
    Ok(format!(
        "📣 Top {} products by {} {}:\n{}",
        top.len(),
        media::MediaMeasure::UnitsSold.label(),
        format::period(period),
        ranked(&top, |v| number(*v))
    ))
}

fn media_units_by_product(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let units = media::product_media_units(d.require_media()?, product, period);
    Ok(format!(
        "📣 {} {} {}: {}",
        title(product),
        media::MediaMeasure::UnitsSold.label(),
        format::period(period),
        number(units)
    ))
}

fn avg_cpa(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let product = intent.product.as_deref();
    let avg = media::avg_cpa(d.require_media()?, product, period);
    let scope = product.map(|p| format!(" for {}", title(p))).unwrap_or_default();
    Ok(format!(
        "🎯 Average CPA{} {}: {}",
        scope,
        format::period(period),
        opt_number(avg)
    ))
}

fn lowest_overall_sv_week(intent: &Intent, d: &Dataset) -> Answer {
    let period = Period::new(None, intent.year);
    Ok(match overall::week_with_lowest_avg_overall_sv(d.require_change()?, intent.year) {
        Some((week, sv)) => format!(
            "📉 Lowest average overall daily SV {}: week {} ({})",
            format::period(period),
            week,
            number(sv)
        ),
        None => nothing("overall SV recorded", period),
    })
}

fn avg_overall_daily_sv(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let avg = overall::avg_overall_daily_sv(d.require_change()?, period);
    Ok(format!(
        "🔍 Average overall daily SV {}: {}",
        format::period(period),
        opt_number(avg)
    ))
}

fn overall_total_units(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let product = intent.product.as_deref();
    let total = overall::overall_total_units(d.require_overall()?, product, period);
    let scope = product.map(|p| format!(" for {}", title(p))).unwrap_or_default();
    Ok(format!(
        "📦 Overall units sold{} {}: {}",
        scope,
        format::period(period),
        number(total)
    ))
}

fn week_change_summary(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let Some(c) = overall::week_change_summary(d.require_change()?, period) else {
        return Ok(nothing("week-over-week change recorded", period));
    };
    let lines = [
        ("Avg TCS media", c.avg_tcs_media),
        ("Avg NI per SKU media", c.avg_ni_sku_media),
        ("Total daily NI media", c.total_daily_ni_media),
        ("Total daily NI organic", c.total_daily_ni_organic),
        ("Avg overall daily SV", c.avg_overall_daily_sv),
        ("Avg daily MSV", c.avg_daily_msv),
        ("Avg daily OSV", c.avg_daily_osv),
        ("Media share %", c.media_share_pct),
        ("Organic share %", c.organic_share_pct),
    ]
    .into_iter()
    .map(|(label, v)| {
        let v = v.map(|v| format!("{}%", signed(v))).unwrap_or_else(|| "no data".into());
        format!("- {}: {}", label, v)
    })
    .collect::<Vec<_>>()
    .join("\n");
    Ok(format!("🔄 Week-over-week change for week {}:\n{}", c.week, lines))
}

fn vendor_units_sold(intent: &Intent, d: &Dataset) -> Answer {
    let vendor = intent.vendor().unwrap_or_default();
    let units = sales::vendor_units_sold(d.require_sales()?, &vendor);
    Ok(format!("🏪 Units sold by {}: {}", vendor, units))
}

fn top_vendor(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match sales::top_vendor(d.require_sales()?, period) {
        Some((vendor, units)) => format!(
            "🏪 Top vendor {}: {} ({} units)",
            format::period(period),
            vendor,
            units
        ),
        None => nothing("vendor sales recorded", period),
    })
}

fn top_n_products(intent: &Intent, d: &Dataset) -> Answer {
    ranked_products(intent, d, SortOrder::Descending)
}

fn bottom_n_products(intent: &Intent, d: &Dataset) -> Answer {
    ranked_products(intent, d, SortOrder::Ascending)
}

fn ranked_products(intent: &Intent, d: &Dataset, order: SortOrder) -> Answer {
    let period = intent.period();
    let top = sales::top_n_products(d.require_sales()?, top_n_of(intent), period, order);
    if top.is_empty() {
        return Ok(nothing("sales recorded", period));
    }
    let label = match order {
        SortOrder::Descending => "Top",
        SortOrder::Ascending => "Bottom",
    };
    Ok(format!(
        "📋 {} {} products {}:\n{}",
        label,
        top.len(),
        format::period(period),
        ranked(&top, |v| format!("{} units", v))
    ))
}

fn top_product(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match sales::top_product(d.require_sales()?, period) {
        Some((product, units)) => format!(
            "🏆 Top product {}: {} ({} units)",
            format::period(period),
            product,
            units
        ),
        None => nothing("sales recorded", period),
    })
}

fn worst_product(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    Ok(match sales::worst_product(d.require_sales()?, period) {
        Some((product, units)) => format!(
            "🐢 Lowest-selling product {}: {} ({} units)",
            format::period(period),
            product,
            units
        ),
        None => nothing("sales recorded", period),
    })
}

fn units_by_week(intent: &Intent, d: &Dataset) -> Answer {
    let product = intent.product.as_deref();
    let weeks = sales::units_by_week(d.require_sales()?, product);
    let scope = product.map(|p| format!(" for {}", title(p))).unwrap_or_default();
    if weeks.is_empty() {
        return Ok(format!("ℹ️ No weekly sales recorded{}.", scope));
    }
    let lines = weeks
        .iter()
        .map(|((year, week), units)| format!("{} week {}: {}", year, week, units))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(format!("📅 Units sold by week{}:\n{}", scope, lines))
}

fn product_units_sold(intent: &Intent, d: &Dataset) -> Answer {
    let product = product_of(intent);
    let period = intent.period();
    let units = sales::product_units_sold(d.require_sales()?, product, period);
    Ok(format!(
        "📦 {} units sold {}: {}",
        title(product),
        format::period(period),
        units
    ))
}

fn total_units_sold(intent: &Intent, d: &Dataset) -> Answer {
    let period = intent.period();
    let units = sales::total_units_sold(d.require_sales()?, period);
    Ok(format!(
        "📦 Total units sold {}: {}",
        format::period(period),
        units
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{dispatch, Dispatch};
    use crate::schema::{ChangeRow, MediaRow, SaleRow};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sale(product: &str, vendor: &str, y: i32, m: u32, d: u32, qty: i64) -> SaleRow {
        let date = NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        let (week, year) = crate::dates::iso_week_key(date);
        SaleRow {
            product: product.into(),
            vendor: vendor.into(),
            order_date: Some(date),
            week: Some(week),
            year: Some(year),
            sold_quantity: qty,
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            raw_sales: Some(vec![
                // 2024-06-03 and 2024-06-09 are both ISO week 23
                sale("Lettuce", "FreshCo", 2024, 6, 3, 10),
                sale("Lettuce", "Green Acres", 2024, 6, 9, 15),
                sale("Thyme", "FreshCo", 2024, 5, 28, 40),
                sale("Thyme", "FreshCo", 2024, 6, 4, 55),
                sale("Basil", "Herbal", 2024, 7, 2, 7),
            ]),
            media: Some(vec![MediaRow {
                product: "Kale".into(),
                week: Some(23),
                year: Some(2024),
                total_daily_ni_media: Some(12.5),
                ni_per_sku: Some(-1.0),
                ..Default::default()
            }]),
            change: Some(vec![
                ChangeRow {
                    week: Some(22),
                    year: Some(2024),
                    media_share_pct: Some(30.0),
                    ..Default::default()
                },
                ChangeRow {
                    week: Some(23),
                    year: Some(2024),
                    media_share_pct: Some(34.5),
                    media_share_pct_change: Some(15.0),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        }
    }

    fn ask(q: &str) -> String {
        ask_in(q, &dataset())
    }

    fn ask_in(q: &str, d: &Dataset) -> String {
        match dispatch(&Intent::extract(q), d) {
            Dispatch::Answered(a) => a,
            Dispatch::NoMatch => panic!("no rule matched {:?}", q),
        }
    }

    fn rule_for(q: &str) -> Option<&'static str> {
        let intent = Intent::extract(q);
        catalog().iter().find(|r| r.matches(&intent)).map(|r| r.name)
    }

    #[test]
    fn rule_names_are_unique() {
        let mut names: Vec<_> = catalog().iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog().len());
    }

    const ROUTES: &[(&str, Option<&str>)] = &[
        ("which product had the highest units sold in week 25", Some("highest_units_sold_week_25")),
        ("top 5 vendors in July", Some("top_5_vendors_july")),
        ("compare total units sold in week 22 vs week 23", Some("compare_units_sold")),
        ("media share change week 22 vs week 23", Some("media_share_change")),
        ("total organic and media units for kale", Some("channel_total_units")),
        ("kale organic vs media units", Some("channel_units")),
        ("kale organic vs media share", Some("channel_share")),
        ("basil organic vs media sv gap", Some("channel_sv_gap")),
        ("top 3 products by cogs", Some("top_cogs_products")),
        ("which product has the highest cogs", Some("highest_cogs_product")),
        ("which week had the highest organic share", Some("week_highest_organic_share")),
        ("product with the lowest organic share", Some("lowest_organic_share_product")),
        ("organic share for basil", Some("organic_share_of_sales")),
        ("weekly net income for thyme organic", Some("weekly_ni_organic")),
        ("average organic ni per sku", Some("avg_ni_sku_organic")),
        ("avg daily osv in week 23", Some("avg_daily_osv")),
        ("which product has the highest organic sv", Some("highest_daily_organic_sv")),
        ("total organic sv in week 23", Some("total_organic_sv")),
        ("media net income for kale", Some("media_ni_by_product")),
        ("which products have negative net income", Some("negative_ni_media")),
        ("which products have positive net income", Some("positive_ni_media")),
        ("average media ni per sku", Some("avg_ni_per_sku_media")),
        ("which product had the top media net income", Some("top_ni_product_media")),
        ("total net income in media for week 30", Some("total_ni_media")),
        ("which week had the highest msv", Some("week_highest_daily_msv")),
        ("top media units in week 23", Some("top_media_units")),
        ("total media units for kale in week 23", Some("media_units_by_product")),
        ("what is the average cpa for kale", Some("avg_cpa")),
        ("which week had the lowest overall sv", Some("lowest_overall_sv_week")),
        ("average overall daily sv in week 23", Some("avg_overall_daily_sv")),
        ("overall units sold for basil", Some("overall_total_units")),
        ("week over week change for week 23", Some("week_change_summary")),
        ("WoW change for week 23", Some("week_change_summary")),
        ("units sold by vendor FreshCo", Some("vendor_units_sold")),
        ("top 3 vendors in august", Some("top_vendors_in_month")),
        ("top vendor in week 24", Some("top_vendor")),
        ("Which vendor had the highest units sold in week 24?", Some("top_vendor")),
        ("top vendors that may grow", Some("top_vendor")),
        ("highest units sold in week 24", Some("highest_units_sold_product")),
        ("top 3 products", Some("top_n_products")),
        ("bottom 3 products in week 23", Some("bottom_n_products")),
        ("what was the best selling product", Some("top_product")),
        ("which product sold the least", Some("worst_product")),
        ("units sold by week", Some("units_by_week")),
        ("How many lettuce units sold in week 23?", Some("product_units_sold")),
        ("total units sold in week 23", Some("total_units_sold")),
        ("show me wowza numbers for week 23", None),
        ("what's the weather", None),
    ];

    #[test]
    fn routing() {
        for (q, expected) in ROUTES {
            assert_eq!(rule_for(q), *expected, "question: {}", q);
        }
    }

    #[test]
    fn every_rule_is_routed() {
        let routed: std::collections::HashSet<&str> = ROUTES.iter().filter_map(|(_, r)| *r).collect();
        let unrouted: Vec<&str> = catalog()
            .iter()
            .map(|r| r.name)
            .filter(|n| !routed.contains(n))
            .collect();
        assert!(unrouted.is_empty(), "rules without a routing case: {:?}", unrouted);
    }

    #[test]
    fn narrow_rules_win() {
        let d = Dataset {
            raw_sales: Some(vec![
                // 2024-06-10 .. 2024-06-16 is ISO week 24
                sale("Kale", "FreshCo", 2024, 6, 10, 10),
                sale("Basil", "Herbal", 2024, 6, 11, 3),
                sale("Basil", "Herbal", 2024, 6, 12, 9),
            ]),
            media: Some(vec![
                MediaRow {
                    product: "Kale".into(),
                    week: Some(23),
                    year: Some(2024),
                    media_units_sold: Some(40.0),
                    ..Default::default()
                },
                MediaRow {
                    product: "Kale".into(),
                    week: Some(23),
                    year: Some(2024),
                    media_units_sold: Some(2.0),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        assert_eq!(
            ask_in("Which vendor had the highest units sold in week 24?", &d),
            "🏪 Top vendor in week 24: Herbal (12 units)"
        );
        assert_eq!(
            ask_in("highest units sold in week 24", &d),
            "🏆 Highest units sold in week 24: Basil (12 units)"
        );
        assert_eq!(
            ask_in("total media units for kale in week 23", &d),
            "📣 Kale media units sold in week 23: 42"
        );
        assert_eq!(ask_in("kale units sold in week 24", &d), "📦 Kale units sold in week 24: 10");
    }

    #[test]
    fn sales_answers() {
        assert_eq!(ask("total units sold in week 23"), "📦 Total units sold in week 23: 80");
        assert_eq!(
            ask("lettuce units sold in week 23"),
            "📦 Lettuce units sold in week 23: 25"
        );
        assert_eq!(
            ask("compare thyme units sold week 22 vs week 23"),
            "📊 Units sold (all products): week 22 = 40, week 23 = 80 (change +40)"
        );
        assert_eq!(ask("units sold by vendor freshco"), "🏪 Units sold by freshco: 105");
        assert_eq!(
            ask("top 5 vendors in july"),
            "🏅 Top 1 vendors in July:\n1. Herbal: 7 units"
        );
    }

    #[test]
    fn media_and_change_answers() {
        assert_eq!(
            ask("total net income in media for week 30"),
            "💵 Total media net income in week 30: 0"
        );
        assert_eq!(
            ask("media share change week 22 vs week 23"),
            "📈 Media share % changed by +4.50 points from week 22 to week 23"
        );
        assert_eq!(
            ask("which products have negative net income"),
            "🔻 Products with negative media NI per SKU across all weeks: Kale"
        );
        assert!(ask("week over week change for week 23").contains("- Media share %: +15%"));
    }

    #[test]
    fn absent_sheet_is_reported() {
        assert_eq!(
            ask("organic share for basil"),
            "⚠️ Sheet `Organic` is not available in the current dataset"
        );
    }
}
