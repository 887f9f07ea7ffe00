//! Express + Mongoose + Zod module: routes, controllers, services, model,
//! validation and types.

use crate::naming::capitalize;
use devscripts_core::FileEntry;

pub fn express_mongoose_zod_template(module: &str) -> Vec<FileEntry> {
    let cap = capitalize(module);

    vec![
        FileEntry::new(
            format!("{module}.routes.ts"),
            format!(
                r#"import {{ Router }} from 'express';
import {{ {module}Controllers }} from './{module}.controllers';

const router = Router();

router.get('/', {module}Controllers.getAll{cap}s);

export const {module}Routes = router;
"#
            ),
        ),
        FileEntry::new(
            format!("{module}.controllers.ts"),
            format!(
                r#"import catchAsync from '../../utilities/catchAsync';
import sendResponse from '../../utilities/sendResponse';
import {{ {module}Services }} from './{module}.services';

const getAll{cap}s = catchAsync(async (_req, res) => {{
    const {module}s = await {module}Services.getAll{cap}sFromDB();

    sendResponse(res, '{cap}', 'GET', {module}s);
}});

export const {module}Controllers = {{ getAll{cap}s }};
"#
            ),
        ),
        FileEntry::new(
            format!("{module}.services.ts"),
            format!(
                r#"import {{ QueryBuilder }} from '../../classes/QueryBuilder';
import {{ {cap} }} from './{module}.model';

const getAll{cap}sFromDB = async (query?: Record<string, unknown>) => {{
    const {module}Query = new QueryBuilder({cap}.find(), query).sort();

    const {module}s = await {module}Query.modelQuery;

    return {module}s;
}};

export const {module}Services = {{ getAll{cap}sFromDB }};
"#
            ),
        ),
        FileEntry::new(
            format!("{module}.model.ts"),
            format!(
                r#"import {{ Schema, model }} from 'mongoose';
import type {{ I{cap}Doc }} from './{module}.types';

const {module}Schema = new Schema<I{cap}Doc>(
    {{
        // Define schema here
    }},
    {{
        timestamps: {{
            createdAt: 'created_at',
            updatedAt: 'updated_at',
        }},
        versionKey: false,
    }},
);

export const {cap} = model<I{cap}Doc>('{cap}', {module}Schema);
"#
            ),
        ),
        FileEntry::new(
            format!("{module}.validation.ts"),
            format!(
                r#"import {{ z }} from 'zod';

const creationSchema = z
    .object({{}})
    .strict();

export const {module}Validations = {{ creationSchema }};
"#
            ),
        ),
        FileEntry::new(
            format!("{module}.types.ts"),
            format!(
                r#"import type {{ Document, Types }} from 'mongoose';

export interface I{cap} {{
    // Define interface
    property: 'Define types';
}}

export interface I{cap}Doc extends I{cap}, Document {{
    _id: Types.ObjectId;
    created_at: string;
    updated_at: string;
}}
"#
            ),
        ),
    ]
}
